use std::fmt;

use serde::{Serialize, Serializer};

use crate::classify::ClassifiedMatch;
use crate::outcome::{Outcome, outcomes_to_string};

/// One complete coupon, one symbol per match in coupon order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicketRow(Vec<Outcome>);

impl fmt::Display for TicketRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&outcomes_to_string(&self.0))
    }
}

impl Serialize for TicketRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn expected_row_count(matches: &[ClassifiedMatch]) -> usize {
    matches.iter().map(|m| m.allowed.len()).product()
}

/// Cross-product of every match's allowed outcomes, folded left to right:
/// existing prefixes stay in order and each is extended by the match's
/// outcomes in their listed order.
pub fn expand(matches: &[ClassifiedMatch]) -> Vec<TicketRow> {
    let mut prefixes: Vec<Vec<Outcome>> = vec![Vec::with_capacity(matches.len())];
    for m in matches {
        let mut next = Vec::with_capacity(prefixes.len() * m.allowed.len());
        for prefix in &prefixes {
            for outcome in &m.allowed {
                let mut row = prefix.clone();
                row.push(*outcome);
                next.push(row);
            }
        }
        prefixes = next;
    }
    prefixes.into_iter().map(TicketRow).collect()
}

/// Newline-joined rows, ready to paste into the betting site.
pub fn render_rows(rows: &[TicketRow]) -> String {
    rows.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
