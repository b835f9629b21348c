//! Interactive console session.
//!
//! A session is either logged out or holds the one account that logged in.
//! Each input line is parsed into a [`Command`], run against the
//! [`BankingService`], and answered with a single reply.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::error;

use crate::account::Account;
use crate::config::Config;
use crate::error::BankError;
use crate::service::BankingService;
use crate::types::command::{Command, USAGE};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn(Account),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Reply(String),
    Quit,
}

pub struct Session {
    service: BankingService,
    config: Config,
    state: SessionState,
}

impl Session {
    pub fn new(service: BankingService, config: Config) -> Self {
        Self {
            service,
            config,
            state: SessionState::LoggedOut,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current(&self) -> Option<&Account> {
        match &self.state {
            SessionState::LoggedIn(account) => Some(account),
            SessionState::LoggedOut => None,
        }
    }

    /// Parse and run one line. Errors become replies; the session goes on.
    pub async fn handle_line(&mut self, line: &str) -> Outcome {
        let result = match line.parse::<Command>() {
            Ok(cmd) => self.execute(cmd).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_internal() {
                    error!(error = %e, "command failed");
                }
                if matches!(e, BankError::InvalidCommand(_)) {
                    Outcome::Reply(format!("Error: {e} (type `help` for usage)"))
                } else {
                    Outcome::Reply(format!("Error: {e}"))
                }
            }
        }
    }

    pub async fn execute(&mut self, cmd: Command) -> Result<Outcome, BankError> {
        let service = &self.service;
        let money = |amount: f64| self.config.format_amount(amount);

        let reply = match cmd {
            Command::Help => USAGE.to_string(),
            Command::Quit => return Ok(Outcome::Quit),
            Command::Register(new) => {
                let account = service.register(new).await?;
                format!(
                    "{} {} account created successfully.",
                    account.phone_number,
                    account.kind.kind()
                )
            }
            Command::Login { phone_number, pin } => {
                if let SessionState::LoggedIn(_) = self.state {
                    return Err(BankError::AlreadyLoggedIn);
                }
                let account = service.authenticate(&phone_number, &pin).await?;
                let reply = format!("{} logged in successfully.", account.phone_number);
                self.state = SessionState::LoggedIn(account);
                reply
            }
            Command::Logout => {
                let account = logged_in(&mut self.state)?;
                let reply = format!("{} logged out.", account.phone_number);
                self.state = SessionState::LoggedOut;
                reply
            }
            Command::Accounts => {
                logged_in(&mut self.state)?;
                let accounts = service.accounts().await?;
                if accounts.is_empty() {
                    "No accounts registered.".to_string()
                } else {
                    accounts
                        .iter()
                        .map(|a| {
                            format!(
                                "{:<16} {:<10} {:<20} {}",
                                a.phone_number,
                                a.kind.kind(),
                                a.name.as_deref().unwrap_or("-"),
                                money(a.balance)
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            Command::Deposit(amount) => {
                let account = logged_in(&mut self.state)?;
                let balance = service.deposit(account, amount).await?;
                format!(
                    "{} deposited {}. Current balance is: {}",
                    account.phone_number,
                    money(amount),
                    money(balance)
                )
            }
            Command::Withdraw(amount) => {
                let account = logged_in(&mut self.state)?;
                let balance = service.withdraw(account, amount).await?;
                format!(
                    "{} withdrew {}. Current balance is: {}",
                    account.phone_number,
                    money(amount),
                    money(balance)
                )
            }
            Command::Transfer { target, amount } => {
                let account = logged_in(&mut self.state)?;
                let target = service.transfer(account, &target, amount).await?;
                format!(
                    "Transferred {} from {} to {}",
                    money(amount),
                    account.phone_number,
                    target.phone_number
                )
            }
            Command::Balance => {
                let account = logged_in(&mut self.state)?;
                let balance = service.balance(account).await?;
                format!("Your current balance is: {}", money(balance))
            }
            Command::Interest => {
                let account = logged_in(&mut self.state)?;
                let interest = service.calculate_interest(account)?;
                format!("Calculated interest: {interest}")
            }
            Command::Repay(amount) => {
                let account = logged_in(&mut self.state)?;
                let outstanding = service.repay_loan(account, amount).await?;
                format!("Loan repaid with amount {amount}. Remaining loan: {outstanding}")
            }
            Command::Claim(amount) => {
                let account = logged_in(&mut self.state)?;
                let claim = service.claim_insurance(account, amount)?;
                format!(
                    "Insurance claim of {} has been made on policy number {}",
                    claim.amount, claim.policy_number
                )
            }
            Command::Rename(name) => {
                let account = logged_in(&mut self.state)?;
                service.rename(account, &name).await?;
                format!("Name updated to {name}.")
            }
        };
        Ok(Outcome::Reply(reply))
    }
}

fn logged_in(state: &mut SessionState) -> Result<&mut Account, BankError> {
    match state {
        SessionState::LoggedIn(account) => Ok(account),
        SessionState::LoggedOut => Err(BankError::NotLoggedIn),
    }
}

/// Drive a session from `input` until end of input or `quit`.
pub async fn run<R, W>(session: &mut Session, input: R, mut output: W) -> Result<(), BankError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(b"> ").await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            output.write_all(b"> ").await?;
            output.flush().await?;
            continue;
        }
        match session.handle_line(&line).await {
            Outcome::Quit => break,
            Outcome::Reply(reply) => {
                output.write_all(reply.as_bytes()).await?;
                output.write_all(b"\n> ").await?;
                output.flush().await?;
            }
        }
    }
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
