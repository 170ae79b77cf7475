use crate::commands::{fmt_date, render_table, Align, Out};
use crate::error::{Error, ErrorType};
use crate::model::{Amount, StatusRow};
use crate::{Ledger, Result};

/// Shows the budget, total spent and remaining budget of every project.
pub async fn status(ledger: &mut Ledger) -> Result<Out<Vec<StatusRow>>> {
    let rows = ledger.status().await;
    if ledger.last_load_failed() {
        return Err(Error::msg(
            ErrorType::Fetch,
            "Unable to compute the status, the spreadsheet could not be read",
        ));
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.project_id().to_string(),
                r.name().to_string(),
                fmt_date(r.start_date()),
                r.initial_budget().to_string(),
                r.total_spent().to_string(),
                r.remaining().to_string(),
            ]
        })
        .collect();
    let table = render_table(
        &[
            ("id", Align::Left),
            ("name", Align::Left),
            ("start date", Align::Left),
            ("initial budget", Align::Right),
            ("total spent", Align::Right),
            ("remaining", Align::Right),
        ],
        &cells,
    );

    let over: Vec<&str> = rows
        .iter()
        .filter(|r| r.remaining().is_negative())
        .map(StatusRow::project_id)
        .collect();
    let remaining: Amount = rows.iter().map(StatusRow::remaining).sum();
    let mut message = format!(
        "{} project(s), {} remaining in total",
        rows.len(),
        remaining
    );
    if !over.is_empty() {
        message.push_str(&format!(", over budget: {}", over.join(", ")));
    }
    Ok(Out::new(message, rows).with_table(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_status() {
        let env = TestEnv::new().await;
        let out = status(&mut env.ledger()).await.unwrap();
        let rows = out.structure().unwrap();
        assert_eq!(rows.len(), 3);
        // 8000 + (250000 - 60750.40) + 18500.50
        assert_eq!(
            out.message(),
            "3 project(s), R$ 215.750,10 remaining in total"
        );
        let table = out.table().unwrap();
        assert!(table.contains("R$ 10.000,00"));
        assert!(table.contains("R$ 8.000,00"));
        assert!(table.contains("R$ 189.249,60"));
    }

    #[tokio::test]
    async fn test_status_over_budget() {
        let env = TestEnv::new().await;
        let mut state = env.state();
        if let Some(rows) = state.tabs.get_mut("Expenses") {
            rows.push(vec![
                "003".into(),
                "1".into(),
                "2025-03-10".into(),
                "20.000,75".into(),
            ]);
        }
        env.set_state(state);

        let out = status(&mut env.ledger()).await.unwrap();
        assert!(out.message().ends_with("over budget: 003"), "{}", out.message());
        assert!(out.table().unwrap().contains("R$ -1.500,25"));
    }

    #[tokio::test]
    async fn test_status_fetch_failure() {
        let env = TestEnv::new().await;
        let mut state = env.state();
        state.tabs.remove("Expenses");
        env.set_state(state);
        let err = status(&mut env.ledger()).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Fetch);
    }
}
