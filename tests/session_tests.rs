mod common;

use common::TempDb;
use mobile_bank::session::{self, Outcome, Session, SessionState};

fn reply(outcome: Outcome) -> String {
    match outcome {
        Outcome::Reply(text) => text,
        Outcome::Quit => panic!("unexpected quit"),
    }
}

#[tokio::test]
async fn login_logout_state_machine() {
    let db = TempDb::new("session-state");
    let mut s = Session::new(db.service().await, db.config());
    assert_eq!(s.state(), &SessionState::LoggedOut);

    let out = reply(s.handle_line("deposit 10").await);
    assert_eq!(out, "Error: Not logged in");

    let out = reply(s.handle_line("register 01711 4321 mobile Rina").await);
    assert_eq!(out, "01711 mobile account created successfully.");
    assert_eq!(s.state(), &SessionState::LoggedOut);

    let out = reply(s.handle_line("login 01711 0000").await);
    assert_eq!(out, "Error: Invalid mobile number or PIN");
    assert!(s.current().is_none());

    let out = reply(s.handle_line("login 01711 4321").await);
    assert_eq!(out, "01711 logged in successfully.");
    assert_eq!(s.current().map(|a| a.phone_number.as_str()), Some("01711"));

    let out = reply(s.handle_line("login 01711 4321").await);
    assert_eq!(out, "Error: Already logged in; logout first");

    let out = reply(s.handle_line("logout").await);
    assert_eq!(out, "01711 logged out.");
    assert_eq!(s.state(), &SessionState::LoggedOut);

    let out = reply(s.handle_line("logout").await);
    assert_eq!(out, "Error: Not logged in");

    let out = reply(s.handle_line("accounts").await);
    assert_eq!(out, "Error: Not logged in");
}

#[tokio::test]
async fn account_commands_render_amounts() {
    let db = TempDb::new("session-money");
    let mut s = Session::new(db.service().await, db.config());

    s.handle_line("register +8800000 1234 savings 0.05").await;
    s.handle_line("login +8800000 1234").await;

    let out = reply(s.handle_line("deposit 1000").await);
    assert_eq!(
        out,
        "+8800000 deposited 1000 Tk/=. Current balance is: 1000 Tk/="
    );

    let out = reply(s.handle_line("interest").await);
    assert_eq!(out, "Calculated interest: 50");

    let out = reply(s.handle_line("withdraw 5000").await);
    assert!(out.starts_with("Error: Insufficient funds"), "{out}");

    let out = reply(s.handle_line("balance").await);
    assert_eq!(out, "Your current balance is: 1000 Tk/=");

    let out = reply(s.handle_line("repay 10").await);
    assert_eq!(
        out,
        "Error: Operation `repay` is not available for savings accounts"
    );
}

#[tokio::test]
async fn transfer_between_registered_accounts() {
    let db = TempDb::new("session-transfer");
    let mut s = Session::new(db.service().await, db.config());

    s.handle_line("register 111 1 mobile").await;
    s.handle_line("register 222 2 loan 500 Jamal Uddin").await;
    s.handle_line("login 111 1").await;
    s.handle_line("deposit 300").await;

    let out = reply(s.handle_line("transfer 222 120").await);
    assert_eq!(out, "Transferred 120 Tk/= from 111 to 222");
    let out = reply(s.handle_line("transfer 333 1").await);
    assert_eq!(out, "Error: Account 333 not found");
    s.handle_line("logout").await;

    s.handle_line("login 222 2").await;
    let out = reply(s.handle_line("balance").await);
    assert_eq!(out, "Your current balance is: 120 Tk/=");
    let out = reply(s.handle_line("repay 200").await);
    assert_eq!(out, "Loan repaid with amount 200. Remaining loan: 300");

    let out = reply(s.handle_line("accounts").await);
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("111"));
    assert!(lines[1].contains("Jamal Uddin"));
    assert!(lines[1].ends_with("120 Tk/="));
}

#[tokio::test]
async fn parse_errors_point_at_help() {
    let db = TempDb::new("session-parse");
    let mut s = Session::new(db.service().await, db.config());

    let out = reply(s.handle_line("fly away").await);
    assert!(out.contains("type `help` for usage"), "{out}");

    let out = reply(s.handle_line("deposit lots").await);
    assert_eq!(out, "Error: Invalid amount: `lots` is not a number");

    let out = reply(s.handle_line("help").await);
    assert!(out.contains("transfer <phone> <amount>"));

    assert_eq!(s.handle_line("quit").await, Outcome::Quit);
}

#[tokio::test]
async fn run_reads_until_quit() {
    let db = TempDb::new("session-run");
    let mut s = Session::new(db.service().await, db.config());

    let input: &[u8] = b"register 555 9 insurance POL-1\nlogin 555 9\n\nclaim 75\nquit\ndeposit 1\n";
    let mut output = Vec::new();
    session::run(&mut s, input, &mut output).await.unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("555 insurance account created successfully."));
    assert!(text.contains("Insurance claim of 75 has been made on policy number POL-1"));
    // nothing after `quit` runs
    assert!(!text.contains("deposited"));
}
