//! Position assignment for columns, cards and checklist items.
//!
//! Siblings are never renumbered. New entries append at `max + 1` (0 for the
//! first), explicit positions are stored as given and may tie.

use uuid::Uuid;

use crate::DbConn;
use crate::{
    error::{Error, Result},
    queries::{cards, checklists, columns},
    validation::validate_position,
};

/// `(max ?? -1) + 1`, failing when the sibling maximum leaves no room to append.
pub fn next_position(current_max: Option<i64>) -> Result<i64> {
    match current_max {
        None => Ok(0),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| Error::validation("position", "No position left to append after the last entry")),
    }
}

pub async fn column_position(conn: &mut DbConn, board_id: Uuid, explicit: Option<i64>) -> Result<i64> {
    if let Some(position) = explicit {
        return validate_position(position);
    }
    let max = columns::max_column_position(conn, board_id).await?;
    next_position(max)
}

pub async fn card_position(conn: &mut DbConn, column_id: Uuid, explicit: Option<i64>) -> Result<i64> {
    if let Some(position) = explicit {
        return validate_position(position);
    }
    let max = cards::max_card_position(conn, column_id).await?;
    next_position(max)
}

pub async fn checklist_position(conn: &mut DbConn, card_id: Uuid) -> Result<i64> {
    let max = checklists::max_item_position(conn, card_id).await?;
    next_position(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_position() {
        assert_eq!(next_position(None).unwrap(), 0);
        assert_eq!(next_position(Some(0)).unwrap(), 1);
        assert_eq!(next_position(Some(41)).unwrap(), 42);
        assert!(matches!(next_position(Some(i64::MAX)), Err(Error::Validation(_))));
    }
}
