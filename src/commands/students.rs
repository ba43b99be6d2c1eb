use crate::db::db::Db;
use crate::db::users::Users;
use crate::libs::config::Config;
use crate::libs::user::UserProfile;
use crate::libs::view::View;
use anyhow::Result;

pub fn cmd() -> Result<()> {
    let db = Db::open(&Config::read_database()?)?;
    let students: Vec<UserProfile> = Users::new(&db.conn).list_students()?.iter().map(UserProfile::from).collect();
    View::students(&students);

    Ok(())
}
