use std::path::PathBuf;

use crate::{
    db::{DbPool, OrmConn},
    otp::OtpStore,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub otp: OtpStore,
    pub upload_dir: PathBuf,
}
