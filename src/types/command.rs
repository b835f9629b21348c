use std::str::FromStr;

use crate::account::{AccountKind, Kind};
use crate::error::BankError;
use crate::service::NewAccount;

pub const USAGE: &str = "\
commands:
  register <phone> <pin> <kind> [kind-field] [name...]
      kind: mobile | savings <rate> | loan <amount> | insurance <policy>
  login <phone> <pin>
  logout
  rename <name...>
  deposit <amount>
  withdraw <amount>
  transfer <phone> <amount>
  balance
  interest
  repay <amount>
  claim <amount>
  accounts
  help
  quit";

/// One line of console input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Register(NewAccount),
    Login { phone_number: String, pin: String },
    Logout,
    Rename(String),
    Deposit(f64),
    Withdraw(f64),
    Transfer { target: String, amount: f64 },
    Balance,
    Interest,
    Repay(f64),
    Claim(f64),
    Accounts,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = BankError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(BankError::InvalidCommand("empty input".to_string()));
        };
        let args: Vec<&str> = words.collect();

        let cmd = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("register", [phone, pin, kind, rest @ ..]) => {
                Command::Register(parse_registration(phone, pin, kind, rest)?)
            }
            ("login", [phone, pin]) => Command::Login {
                phone_number: phone.to_string(),
                pin: pin.to_string(),
            },
            ("logout", []) => Command::Logout,
            ("rename", [_, ..]) => Command::Rename(args.join(" ")),
            ("deposit", [amount]) => Command::Deposit(parse_amount(amount)?),
            ("withdraw", [amount]) => Command::Withdraw(parse_amount(amount)?),
            ("transfer", [target, amount]) => Command::Transfer {
                target: target.to_string(),
                amount: parse_amount(amount)?,
            },
            ("balance", []) => Command::Balance,
            ("interest", []) => Command::Interest,
            ("repay", [amount]) => Command::Repay(parse_amount(amount)?),
            ("claim", [amount]) => Command::Claim(parse_amount(amount)?),
            ("accounts", []) => Command::Accounts,
            ("help", _) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            _ => {
                return Err(BankError::InvalidCommand(format!(
                    "cannot parse `{}`",
                    line.trim()
                )));
            }
        };
        Ok(cmd)
    }
}

fn parse_registration(
    phone: &str,
    pin: &str,
    kind: &str,
    rest: &[&str],
) -> Result<NewAccount, BankError> {
    let kind: Kind = kind.parse()?;
    let (kind, name_words) = match (kind, rest) {
        (Kind::Mobile, name) => (AccountKind::Mobile, name),
        (Kind::Savings, [rate, name @ ..]) => (
            AccountKind::Savings {
                interest_rate: parse_amount(rate)?,
            },
            name,
        ),
        (Kind::Loan, [amount, name @ ..]) => (
            AccountKind::Loan {
                loan_amount: parse_amount(amount)?,
            },
            name,
        ),
        (Kind::Insurance, [policy, name @ ..]) => (
            AccountKind::Insurance {
                policy_number: policy.to_string(),
            },
            name,
        ),
        (kind, []) => {
            return Err(BankError::InvalidCommand(format!(
                "{kind} accounts need an extra field"
            )));
        }
    };

    let name = (!name_words.is_empty()).then(|| name_words.join(" "));
    Ok(NewAccount {
        phone_number: phone.to_string(),
        name,
        pin: pin.to_string(),
        kind,
    })
}

/// Parse a decimal amount. Range checks happen in the banking service.
pub fn parse_amount(s: &str) -> Result<f64, BankError> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| BankError::InvalidAmount(format!("`{s}` is not a number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_savings_registration_with_name() {
        let cmd: Command = "register +8800000 1234 savings 0.05 Abdul Karim"
            .parse()
            .unwrap();
        assert_eq!(
            cmd,
            Command::Register(NewAccount {
                phone_number: "+8800000".to_string(),
                name: Some("Abdul Karim".to_string()),
                pin: "1234".to_string(),
                kind: AccountKind::Savings {
                    interest_rate: 0.05
                },
            })
        );
    }

    #[test]
    fn plain_registration_needs_no_field() {
        let cmd: Command = "register 017 0000 plain".parse().unwrap();
        let Command::Register(new) = cmd else {
            panic!("expected register");
        };
        assert_eq!(new.kind, AccountKind::Mobile);
        assert_eq!(new.name, None);
    }

    #[test]
    fn kind_field_is_required() {
        let err = "register 017 0000 loan".parse::<Command>().unwrap_err();
        assert!(matches!(err, BankError::InvalidCommand(msg) if msg.contains("loan")));
    }

    #[test]
    fn malformed_amount_is_reported() {
        let err = "deposit ten".parse::<Command>().unwrap_err();
        assert!(matches!(err, BankError::InvalidAmount(_)));
    }

    #[test]
    fn account_commands() {
        assert_eq!("deposit 10".parse::<Command>().unwrap(), Command::Deposit(10.0));
        assert_eq!(
            "transfer 018 2.5".parse::<Command>().unwrap(),
            Command::Transfer {
                target: "018".to_string(),
                amount: 2.5
            }
        );
        assert_eq!("BALANCE".parse::<Command>().unwrap(), Command::Balance);
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!(
            "rename Nusrat  Jahan".parse::<Command>().unwrap(),
            Command::Rename("Nusrat Jahan".to_string())
        );
    }

    #[test]
    fn wrong_arity_is_rejected() {
        assert!("withdraw".parse::<Command>().is_err());
        assert!("login 017".parse::<Command>().is_err());
        assert!("logout now".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }
}
