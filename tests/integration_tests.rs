use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{init_db_with_admin, rcrm, setup_test_db, temp_dir, temp_out};

#[test]
fn test_init_and_session() {
    let db_path = setup_test_db("cli_session");

    rcrm()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"))
        .stdout(contains("13 fields in the catalog"));

    rcrm()
        .args(["--db", &db_path, "whoami"])
        .assert()
        .success()
        .stdout(contains("Nobody is signed in"));

    rcrm()
        .args(["--db", &db_path, "user", "add", "boss@example.com", "Boss"])
        .assert()
        .success()
        .stdout(contains("Created user #1").and(contains("(admin)")));

    rcrm()
        .args(["--db", &db_path, "login", "boss@example.com"])
        .assert()
        .success();

    rcrm()
        .args(["--db", &db_path, "whoami"])
        .assert()
        .success()
        .stdout(contains("boss@example.com").and(contains("admin")));

    rcrm()
        .args(["--db", &db_path, "logout"])
        .assert()
        .success()
        .stdout(contains("Signed out"));

    rcrm()
        .args(["--db", &db_path, "client", "list"])
        .assert()
        .failure()
        .stderr(contains("Authentication required"));
}

#[test]
fn test_client_crud_from_cli() {
    let db_path = setup_test_db("cli_clients");
    init_db_with_admin(&db_path);

    rcrm()
        .args([
            "--db", &db_path, "client", "add", "-s", "name=Ann Smith", "-s", "email=ann@x.com",
            "-s", "status=Active",
        ])
        .assert()
        .success()
        .stdout(contains("Created client #1 Ann Smith"));

    rcrm()
        .args(["--db", &db_path, "client", "add", "-s", "name=No Mail"])
        .assert()
        .failure()
        .stderr(contains("'Email' is required"));

    rcrm()
        .args(["--db", &db_path, "client", "edit", "1", "-s", "company=Acme"])
        .assert()
        .success();

    rcrm()
        .args(["--db", &db_path, "client", "show", "1"])
        .assert()
        .success()
        .stdout(contains("Ann Smith").and(contains("Acme")).and(contains("Active")));

    rcrm()
        .args(["--db", &db_path, "client", "list"])
        .assert()
        .success()
        .stdout(contains("ann@x.com"))
        .stdout(contains("1 client(s)"));
}

#[test]
fn test_report_export_and_templates() {
    let db_path = setup_test_db("cli_report");
    init_db_with_admin(&db_path);

    for (name, email, revenue) in [("Ann", "a@x.com", "100"), ("Bo", "b@x.com", "250")] {
        rcrm()
            .args([
                "--db",
                &db_path,
                "client",
                "add",
                "-s",
                &format!("name={name}"),
                "-s",
                &format!("email={email}"),
                "-s",
                &format!("revenue={revenue}"),
            ])
            .assert()
            .success();
    }

    rcrm()
        .args([
            "--db", &db_path, "report", "run", "-F", "name,revenue", "--formula",
            "twice=sum:revenue,revenue", "--preview",
        ])
        .assert()
        .success()
        .stdout(contains("Ann").and(contains("500")).and(contains("2 row(s)")));

    let pdf = temp_out("cli_report_pdf", "pdf");
    rcrm()
        .args([
            "--db", &db_path, "report", "run", "-F", "name,email", "--format", "pdf", "--save-as",
            "Contacts", "--out", &pdf,
        ])
        .assert()
        .success()
        .stdout(contains("Saved template #1 'Contacts'"));
    assert!(fs::read(&pdf).expect("read pdf").starts_with(b"%PDF"));

    // refuses to overwrite without --force
    rcrm()
        .args(["--db", &db_path, "report", "run", "-F", "name", "--out", &pdf])
        .assert()
        .failure()
        .stderr(contains("--force"));

    rcrm()
        .args(["--db", &db_path, "template", "list"])
        .assert()
        .success()
        .stdout(contains("Contacts").and(contains("name, email")));

    let xlsx = temp_out("cli_report_xlsx", "xlsx");
    rcrm()
        .args([
            "--db", &db_path, "report", "run", "--template", "1", "--format", "excel", "--out",
            &xlsx,
        ])
        .assert()
        .success()
        .stdout(contains("Using template #1"));
    assert!(fs::read(&xlsx).expect("read xlsx").starts_with(b"PK"));

    rcrm()
        .args(["--db", &db_path, "report", "run", "--template", "1", "-F", "name"])
        .assert()
        .failure();

    rcrm()
        .args(["--db", &db_path, "report", "run", "-F", "name", "--range", "2025-13", "--preview"])
        .assert()
        .failure()
        .stderr(contains("Invalid date format"));
}

#[test]
fn test_deletion_workflow_from_cli() {
    let db_path = setup_test_db("cli_deletion");
    init_db_with_admin(&db_path);

    rcrm()
        .args(["--db", &db_path, "client", "add", "-s", "name=Ann", "-s", "email=a@x.com"])
        .assert()
        .success();

    rcrm()
        .args(["--db", &db_path, "deletion", "request", "--client", "1", "--reason", "duplicate"])
        .assert()
        .success()
        .stdout(contains("pending review"));

    rcrm()
        .args(["--db", &db_path, "deletion", "request", "--client", "1", "--reason", "again"])
        .assert()
        .failure()
        .stderr(contains("already pending"));

    rcrm()
        .args(["--db", &db_path, "deletion", "list", "--status", "pending"])
        .assert()
        .success()
        .stdout(contains("client #1"));

    rcrm()
        .args(["--db", &db_path, "deletion", "approve", "1"])
        .assert()
        .success()
        .stdout(contains("approved"));

    rcrm()
        .args(["--db", &db_path, "deletion", "reject", "1"])
        .assert()
        .failure()
        .stderr(contains("already approved"));

    rcrm()
        .args(["--db", &db_path, "client", "show", "1"])
        .assert()
        .failure()
        .stderr(contains("Not found"));
}

#[test]
fn test_documents_from_cli() {
    let db_path = setup_test_db("cli_docs");
    init_db_with_admin(&db_path);

    rcrm()
        .args(["--db", &db_path, "client", "add", "-s", "name=Ann", "-s", "email=a@x.com"])
        .assert()
        .success();

    let src = temp_out("cli_docs_src", "txt");
    fs::write(&src, "hello documents").expect("write source");

    rcrm()
        .args(["--db", &db_path, "doc", "upload", "1", &src])
        .assert()
        .success()
        .stdout(contains("as document #1").and(contains("text/plain")));

    rcrm()
        .args(["--db", &db_path, "doc", "list", "1"])
        .assert()
        .success()
        .stdout(contains("cli_docs_src_out.txt"));

    let out_dir = temp_dir("cli_docs_out");
    rcrm()
        .args(["--db", &db_path, "doc", "get", "1", "--out", &out_dir.to_string_lossy()])
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(out_dir.join("cli_docs_src_out.txt")).expect("read"),
        "hello documents"
    );

    let output = rcrm()
        .args(["--db", &db_path, "doc", "url", "1"])
        .output()
        .expect("run doc url");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let url = stdout
        .lines()
        .find(|l| l.starts_with("rcrm://"))
        .expect("signed url line")
        .trim()
        .to_string();

    rcrm()
        .args(["--db", &db_path, "logout"])
        .assert()
        .success();

    let fetched = temp_out("cli_docs_fetched", "txt");
    rcrm()
        .args(["--db", &db_path, "doc", "fetch", &url, "--out", &fetched])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&fetched).expect("read"), "hello documents");
}

#[test]
fn test_field_catalog_and_dashboard_from_cli() {
    let db_path = setup_test_db("cli_fields");
    init_db_with_admin(&db_path);

    rcrm()
        .args([
            "--db", &db_path, "field", "add", "tier", "Tier", "--type", "select", "--option",
            "Gold,Silver",
        ])
        .assert()
        .success();

    rcrm()
        .args(["--db", &db_path, "field", "list"])
        .assert()
        .success()
        .stdout(contains("tier").and(contains("Gold, Silver")));

    rcrm()
        .args([
            "--db", &db_path, "client", "add", "-s", "name=Ann", "-s", "email=a@x.com", "-s",
            "tier=Gold",
        ])
        .assert()
        .success();

    rcrm()
        .args(["--db", &db_path, "field", "remove", "tier"])
        .assert()
        .failure()
        .stderr(contains("cannot be removed"));

    rcrm()
        .args(["--db", &db_path, "dashboard", "--by", "tier"])
        .assert()
        .success()
        .stdout(contains("Clients").and(contains("Gold")));

    rcrm()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("migration_applied").and(contains("clients #1")));
}

#[test]
fn test_csv_import_from_cli() {
    let db_path = setup_test_db("cli_import");
    init_db_with_admin(&db_path);

    let csv = temp_out("cli_import", "csv");
    fs::write(&csv, "Name,Email\nAnn,a@x.com\nBo,b@x.com\n").expect("write csv");

    rcrm()
        .args(["--db", &db_path, "client", "import", &csv])
        .assert()
        .success()
        .stdout(contains("Imported 2 client(s)"));

    let tpl = temp_out("cli_import_template", "xlsx");
    rcrm()
        .args(["--db", &db_path, "report", "template", "--out", &tpl])
        .assert()
        .success();
    assert!(fs::read(&tpl).expect("read template").starts_with(b"PK"));
}
