//! The `itdgen` binary end to end.

use anyhow::Result;
use itdgen::test_utils::ProjectFixture;
use predicates::prelude::*;

use crate::common::TestProject;

const JAVA_BEAN_FILE: &str = "out/src/main/java/com/example/Customer_Roo_JavaBean.aj";
const DOD_FILE: &str = "out/src/test/java/com/example/CustomerDataOnDemand_Roo_DataOnDemand.aj";

#[test]
fn test_generate_prints_aspects() -> Result<()> {
    let project = TestProject::new(&ProjectFixture::customer())?;

    project
        .command()
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("privileged aspect Customer_Roo_JavaBean {"))
        .stdout(predicate::str::contains("public java.lang.String Customer.getName() {"))
        .stdout(predicate::str::contains("privileged aspect CustomerDataOnDemand_Roo_DataOnDemand {"));
    Ok(())
}

#[test]
fn test_generate_single_type() -> Result<()> {
    let project = TestProject::new(&ProjectFixture::customer())?;

    project
        .command()
        .args(["generate", "--type", "com.example.Customer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Customer_Roo_JavaBean"))
        .stdout(predicate::str::contains("DataOnDemand").not());
    Ok(())
}

#[test]
fn test_generate_writes_files_once() -> Result<()> {
    let project = TestProject::new(&ProjectFixture::customer())?;

    project
        .command()
        .args(["generate", "--output", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 aspect(s) written, 2 total"));
    assert!(project.path().join(JAVA_BEAN_FILE).exists());
    assert!(project.path().join(DOD_FILE).exists());

    let first = std::fs::read_to_string(project.path().join(DOD_FILE))?;
    assert!(first.contains("obj.setName(name);"));

    project
        .command()
        .args(["generate", "--output", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 aspect(s) written, 2 total"));
    assert_eq!(std::fs::read_to_string(project.path().join(DOD_FILE))?, first);

    project.command().args(["generate", "--output", "out", "--check"]).assert().success();
    Ok(())
}

#[test]
fn test_check_detects_model_change() -> Result<()> {
    let fixture = ProjectFixture::customer();
    let project = TestProject::new(&fixture)?;
    project.command().args(["generate", "--output", "out"]).assert().success();

    let changed = fixture.content.replace(
        "[[types]]\nname = \"com.example.CustomerDataOnDemand\"",
        "[[types.fields]]\nname = \"email\"\ntype = \"java.lang.String\"\n\n\
         [[types]]\nname = \"com.example.CustomerDataOnDemand\"",
    );
    assert_ne!(changed, fixture.content);
    project.write_project(&changed)?;

    project
        .command()
        .args(["generate", "--output", "out", "--check"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("out of date"));

    project.command().args(["generate", "--output", "out"]).assert().success();
    let bean = std::fs::read_to_string(project.path().join(JAVA_BEAN_FILE))?;
    assert!(bean.contains("Customer.getEmail()"));
    project.command().args(["generate", "--output", "out", "--check"]).assert().success();
    Ok(())
}

#[test]
fn test_check_requires_output() -> Result<()> {
    let project = TestProject::new(&ProjectFixture::customer())?;
    project.command().args(["generate", "--check"]).assert().failure();
    Ok(())
}

#[test]
fn test_graph_shows_dependents() -> Result<()> {
    let project = TestProject::new(&ProjectFixture::customer())?;

    project
        .command()
        .args(["graph", "--type", "com.example.Customer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MID:PhysicalType#SRC_MAIN_JAVA?com.example.Customer"))
        .stdout(predicate::str::contains("MID:JavaBean#SRC_MAIN_JAVA?com.example.Customer"))
        .stdout(predicate::str::contains("edge(s)"));
    Ok(())
}

#[test]
fn test_inspect_identifier() -> Result<()> {
    let project = TestProject::new(&ProjectFixture::customer())?;

    project
        .command()
        .args(["inspect", "MID:JavaBean#SRC_MAIN_JAVA?com.example.Customer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tag:         JavaBean"))
        .stdout(predicate::str::contains("path:        SRC_MAIN_JAVA"));

    let output = project
        .command()
        .args(["inspect", "--json", "MID:DataOnDemand"])
        .output()?;
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["tag"], "DataOnDemand");
    assert_eq!(value["class_level"], true);
    assert!(value["target"].is_null());
    Ok(())
}

#[test]
fn test_malformed_identifier_fails() -> Result<()> {
    let project = TestProject::new(&ProjectFixture::customer())?;

    project
        .command()
        .args(["inspect", "JavaBean#SRC_MAIN_JAVA?com.example.Customer"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"));
    Ok(())
}

#[test]
fn test_missing_project_file_fails() -> Result<()> {
    let project = TestProject::new(&ProjectFixture::customer())?;
    std::fs::remove_file(project.project_file())?;

    project
        .command()
        .arg("generate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("itdgen.toml"));
    Ok(())
}

#[test]
fn test_invalid_project_fails() -> Result<()> {
    for fixture in [ProjectFixture::invalid_syntax(), ProjectFixture::invalid_type_name()] {
        let project = TestProject::new(&fixture)?;
        project.command().arg("generate").assert().failure().code(1);
    }
    Ok(())
}

#[test]
fn test_unknown_type_fails() -> Result<()> {
    let project = TestProject::new(&ProjectFixture::customer())?;

    project
        .command()
        .args(["generate", "--type", "com.example.Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("com.example.Nope"));
    Ok(())
}

#[test]
fn test_project_infix_is_applied() -> Result<()> {
    let project = TestProject::new(&ProjectFixture::customer())?;
    std::fs::write(project.path().join("global.toml"), "[engine]\naspect_infix = \"_Gen_\"\n")?;

    project
        .command()
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("privileged aspect Customer_Gen_JavaBean {"));

    let service = TestProject::new(&ProjectFixture::service())?;
    std::fs::write(service.path().join("global.toml"), "[engine]\naspect_infix = \"_Gen_\"\n")?;
    service
        .command()
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("privileged aspect Svc_Roo_JavaBean {"));
    Ok(())
}
