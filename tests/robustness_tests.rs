use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

#[test]
fn test_malformed_rows_are_skipped() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"clientFirstName,clientLastName,companyId,amount,paymentMethod\n")
        .unwrap();
    // Valid
    file.write_all(b"Ana,Lopez,1,500,Visa\n").unwrap();
    // Not UTF-8
    file.write_all(b"\xff\xfe,Lopez,1,500,Visa\n").unwrap();
    // Missing amount
    file.write_all(b"Juan,Perez,1,,Visa\n").unwrap();
    // Valid again
    file.write_all(b"Eva,Ruiz,2,700,Mastercard\n").unwrap();
    file.flush().unwrap();

    let mut cmd = Command::new(cargo_bin!("paydesk"));
    cmd.arg("process").arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading payment request"))
        .stderr(predicate::str::contains("Error processing payment: amount is required"))
        .stdout(predicate::str::contains("\n1,BR-"))
        .stdout(predicate::str::contains("\n2,BR-"))
        .stdout(predicate::str::contains("Eva,Ruiz,2,Aysa,700.00,Mastercard"));
}

#[test]
fn test_invalid_field_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "clientFirstName,clientLastName,companyId,amount,paymentMethod,cardNumber").unwrap();
    writeln!(file, "Ana3,Lopez,1,500,Visa,").unwrap();
    writeln!(file, "Ana,Lopez,one,500,Visa,").unwrap();
    writeln!(file, "Ana,Lopez,1,lots,Visa,").unwrap();
    writeln!(file, "Ana,Lopez,1,500,Visa,1234567890123456").unwrap();
    writeln!(file, "Ana,Lopez,1,500,visa,").unwrap();

    let output = Command::new(cargo_bin!("paydesk"))
        .arg("process")
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1, "only the header is printed");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("Error processing payment").count(), 5);
    assert!(stderr.contains("clientFirstName must be 2 to 50 letters or spaces"));
    assert!(stderr.contains("invalid card number"));
}
