//! External user directories the store is populated from.

use std::future::Future;

use crate::user::NewUser;

pub trait UserSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn fetch_users(
    &self,
  ) -> impl Future<Output = Result<Vec<NewUser>, Self::Error>> + Send + '_;
}
