#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use rcrm::config::Config;
use rcrm::core::auth::AuthLogic;
use rcrm::core::clients::ClientLogic;
use rcrm::core::context::AppContext;
use rcrm::core::users::UserLogic;
use rcrm::db::pool::DbPool;
use rcrm::models::client::Client;
use rcrm::models::user::{Role, User};
use rcrm::storage::FsBlobStore;
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn rcrm() -> Command {
    cargo_bin_cmd!("rcrm")
}

/// Create a unique test DB path inside the system temp dir and remove any
/// existing file (and its blob directory).
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rcrm.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    fs::remove_dir_all(Config::default().with_database(&db_path).storage_root()).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Fresh empty directory inside tempdir
pub fn temp_dir(name: &str) -> PathBuf {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rcrm_dir", name));
    fs::remove_dir_all(&path).ok();
    fs::create_dir_all(&path).expect("create temp dir");
    path
}

/// Initialize the DB via the CLI, create the bootstrap admin and sign in.
pub fn init_db_with_admin(db_path: &str) {
    rcrm()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    rcrm()
        .args(["--db", db_path, "user", "add", "admin@example.com", "Admin"])
        .assert()
        .success();

    rcrm()
        .args(["--db", db_path, "login", "admin@example.com"])
        .assert()
        .success();
}

/// Blob directory used by `test_context(name)`.
pub fn blob_root(name: &str) -> PathBuf {
    env::temp_dir().join(format!("{name}_blobs_rcrm_dir"))
}

/// In-memory record store plus a throwaway blob directory.
pub fn test_context(name: &str) -> AppContext {
    let pool = DbPool::in_memory().expect("in-memory db");
    let blobs = FsBlobStore::new(temp_dir(&format!("{name}_blobs")), "test-secret");
    let cfg = Config::default().with_database(":memory:");
    AppContext::with_parts(pool, Box::new(blobs), cfg).expect("context")
}

/// Bootstrap the first user (always admin) and sign in as them.
pub fn sign_in_admin(ctx: &AppContext) -> User {
    let admin = UserLogic::create(ctx, "admin@example.com", "Admin", Role::Admin).expect("admin");
    AuthLogic::sign_in(ctx, &admin.email).expect("sign in");
    admin
}

/// Create a regular user (an admin must be signed in).
pub fn add_member(ctx: &AppContext, email: &str) -> User {
    UserLogic::create(ctx, email, "Member", Role::User).expect("member")
}

pub fn vals(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn add_client(ctx: &AppContext, name: &str, email: &str) -> Client {
    ClientLogic::create(ctx, &vals(&[("name", name), ("email", email)])).expect("client")
}

/// Backdate a client's creation instant.
pub fn set_created_at(ctx: &AppContext, id: i64, ts: &str) {
    ctx.conn()
        .execute(
            "UPDATE clients SET created_at = ?1 WHERE id = ?2",
            rusqlite::params![ts, id],
        )
        .expect("backdate client");
}
