use crate::domain::account::{Account, AccountId};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct AccountRow<'a> {
    account: AccountId,
    username: &'a str,
    balance: u64,
    referrer: Option<AccountId>,
    joined_at: String,
}

/// Writes the final account state as CSV, sorted by account id for
/// deterministic output.
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_accounts(&mut self, mut accounts: Vec<Account>) -> Result<()> {
        accounts.sort_by_key(|account| account.id);
        for account in &accounts {
            self.writer.serialize(AccountRow {
                account: account.id,
                username: &account.username,
                balance: account.balance.value(),
                referrer: account.referrer_id,
                joined_at: account.joined_at.to_rfc3339(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{Amount, Balance};

    #[test]
    fn test_writer_sorted_output() {
        let mut late = Account::new(9, "last");
        late.credit(Amount::new(150).unwrap()).unwrap();
        let accounts = vec![late, Account::new(2, "first")];

        let mut buffer = Vec::new();
        AccountWriter::new(&mut buffer)
            .write_accounts(accounts)
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next().unwrap(),
            "account,username,balance,referrer,joined_at"
        );
        assert!(lines.next().unwrap().starts_with("2,first,0,,"));
        assert!(lines.next().unwrap().starts_with("9,last,150,,"));
    }

    #[test]
    fn test_writer_includes_referrer() {
        let mut account = Account::new(3, "kid");
        account.referrer_id = Some(2);
        assert_eq!(account.balance, Balance::ZERO);

        let mut buffer = Vec::new();
        AccountWriter::new(&mut buffer)
            .write_accounts(vec![account])
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.lines().nth(1).unwrap().starts_with("3,kid,0,2,"));
    }
}
