//! Prize split in basis points (10000 = whole pool).
//!
//! The output is indexed by on-chain participant, not by lineup. Ties split a
//! tier with floor division; the remainder is left unallocated.

use std::collections::HashMap;

use crate::address::normalize_address;
use crate::types::ContestLineup;

pub const TOTAL_BASIS_POINTS: u32 = 10_000;

/// Contests with at least this many entrants pay the top three.
pub const TOP_THREE_MIN_PARTICIPANTS: usize = 10;

const TOP_THREE: &[(&str, u32)] = &[("1", 7_000), ("2", 2_000), ("3", 1_000)];
const WINNER_TAKES_ALL: &[(&str, u32)] = &[("1", TOTAL_BASIS_POINTS)];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayoutError {
    #[error("lineup {index} is missing {field}")]
    MissingField { index: usize, field: &'static str },

    #[error("no lineup found with position 1")]
    NoWinner,

    #[error("{placement} {wallet} is not among the on-chain participants")]
    NotAParticipant { placement: String, wallet: String },
}

pub fn payout_table(participant_count: usize) -> &'static [(&'static str, u32)] {
    if participant_count >= TOP_THREE_MIN_PARTICIPANTS {
        TOP_THREE
    } else {
        WINNER_TAKES_ALL
    }
}

pub fn placement_name(position: &str) -> String {
    match position {
        "1" => "Winner".to_string(),
        "2" => "Second place".to_string(),
        "3" => "Third place".to_string(),
        other => format!("{other} place"),
    }
}

/// Derive the `distribute` vector for `participants` from the ranked lineups.
pub fn calculate_payouts(
    lineups: &[ContestLineup],
    participants: &[String],
) -> Result<Vec<u32>, PayoutError> {
    let mut by_position: HashMap<&str, Vec<&str>> = HashMap::new();

    for (index, lineup) in lineups.iter().enumerate() {
        let position = lineup
            .position
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or(PayoutError::MissingField {
                index,
                field: "position",
            })?;
        let user = lineup.user.as_ref().ok_or(PayoutError::MissingField {
            index,
            field: "user",
        })?;
        let wallet = user
            .wallet_address
            .as_deref()
            .filter(|w| !w.trim().is_empty())
            .ok_or(PayoutError::MissingField {
                index,
                field: "user.walletAddress",
            })?;

        by_position.entry(position.trim()).or_default().push(wallet);
    }

    if !by_position.contains_key("1") {
        return Err(PayoutError::NoWinner);
    }

    // First occurrence wins if the escrow lists an address twice.
    let mut index_of: HashMap<String, usize> = HashMap::with_capacity(participants.len());
    for (i, participant) in participants.iter().enumerate() {
        index_of.entry(normalize_address(participant)).or_insert(i);
    }

    let mut payouts = vec![0u32; participants.len()];

    for &(position, tier_points) in payout_table(participants.len()) {
        let Some(tied) = by_position.get(position) else {
            continue;
        };
        let share = tier_points / tied.len() as u32;

        for wallet in tied {
            let idx = index_of.get(&normalize_address(wallet)).ok_or_else(|| {
                PayoutError::NotAParticipant {
                    placement: placement_name(position),
                    wallet: wallet.to_string(),
                }
            })?;
            payouts[*idx] += share;
        }
    }

    Ok(payouts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineupUser;

    fn addrs(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    fn ten_participants() -> Vec<String> {
        (0..10).map(|i| format!("0x{:040x}", i + 1)).collect()
    }

    #[test]
    fn winner_takes_all_below_ten_entrants() {
        let participants = addrs(&["0x123", "0x456", "0x789"]);
        let lineups = vec![
            ContestLineup::ranked("0x456", 90.0, "1"),
            ContestLineup::ranked("0x123", 80.0, "2"),
            ContestLineup::ranked("0x789", 70.0, "3"),
        ];

        let payouts = calculate_payouts(&lineups, &participants).unwrap();
        assert_eq!(payouts, vec![0, 10_000, 0]);
    }

    #[test]
    fn top_three_split_with_ten_entrants() {
        let participants = ten_participants();
        let lineups: Vec<_> = participants
            .iter()
            .enumerate()
            .map(|(i, a)| ContestLineup::ranked(a, 100.0 - i as f64, &(i + 1).to_string()))
            .collect();

        let payouts = calculate_payouts(&lineups, &participants).unwrap();
        assert_eq!(payouts, vec![7_000, 2_000, 1_000, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(payouts.iter().sum::<u32>(), TOTAL_BASIS_POINTS);
    }

    #[test]
    fn tie_for_first_splits_evenly() {
        let participants = addrs(&["0x123", "0x456", "0x789"]);
        let lineups = vec![
            ContestLineup::ranked("0x123", 50.0, "1"),
            ContestLineup::ranked("0x456", 50.0, "1"),
            ContestLineup::ranked("0x789", 10.0, "3"),
        ];

        let payouts = calculate_payouts(&lineups, &participants).unwrap();
        assert_eq!(payouts, vec![5_000, 5_000, 0]);
    }

    #[test]
    fn uneven_tie_floors_and_forfeits_remainder() {
        let participants = addrs(&["0xa", "0xb", "0xc"]);
        let lineups = vec![
            ContestLineup::ranked("0xa", 1.0, "1"),
            ContestLineup::ranked("0xb", 1.0, "1"),
            ContestLineup::ranked("0xc", 1.0, "1"),
        ];

        let payouts = calculate_payouts(&lineups, &participants).unwrap();
        assert_eq!(payouts, vec![3_333, 3_333, 3_333]);
        assert_eq!(payouts.iter().sum::<u32>(), 9_999);
    }

    #[test]
    fn wallet_placed_twice_collects_both_tiers() {
        let participants = ten_participants();
        let lineups = vec![
            ContestLineup::ranked(&participants[4], 100.0, "1"),
            ContestLineup::ranked(&participants[4], 95.0, "2"),
            ContestLineup::ranked(&participants[7], 90.0, "3"),
        ];

        let payouts = calculate_payouts(&lineups, &participants).unwrap();
        assert_eq!(payouts[4], 9_000);
        assert_eq!(payouts[7], 1_000);
        assert_eq!(payouts.iter().sum::<u32>(), TOTAL_BASIS_POINTS);
    }

    #[test]
    fn duplicate_participant_pays_first_index() {
        let participants = addrs(&["0x456", "0x123", "0x123"]);
        let lineups = vec![ContestLineup::ranked("0X123", 10.0, "1")];

        let payouts = calculate_payouts(&lineups, &participants).unwrap();
        assert_eq!(payouts, vec![0, 10_000, 0]);
    }

    #[test]
    fn tie_at_second_place_in_large_contest() {
        let participants = ten_participants();
        let lineups = vec![
            ContestLineup::ranked(&participants[0], 9.0, "1"),
            ContestLineup::ranked(&participants[1], 8.0, "2"),
            ContestLineup::ranked(&participants[2], 8.0, "2"),
            ContestLineup::ranked(&participants[3], 7.0, "2"),
            ContestLineup::ranked(&participants[4], 6.0, "5"),
        ];

        let payouts = calculate_payouts(&lineups, &participants).unwrap();
        assert_eq!(&payouts[..5], &[7_000, 666, 666, 666, 0]);
        // no third place declared, tier stays unallocated
        assert_eq!(payouts.iter().sum::<u32>(), 8_998);
    }

    #[test]
    fn addresses_match_case_insensitively() {
        let participants = addrs(&["0xabcdef", "0x123456"]);
        let lineups = vec![ContestLineup::ranked("0xABCDEF", 1.0, "1")];

        assert_eq!(
            calculate_payouts(&lineups, &participants).unwrap(),
            vec![10_000, 0]
        );
    }

    #[test]
    fn output_length_follows_participants_not_lineups() {
        let participants = addrs(&["0x1", "0x2", "0x3", "0x4", "0x5"]);
        let lineups = vec![ContestLineup::ranked("0x4", 1.0, "1")];

        let payouts = calculate_payouts(&lineups, &participants).unwrap();
        assert_eq!(payouts.len(), participants.len());
        assert_eq!(payouts, vec![0, 0, 0, 10_000, 0]);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let participants = addrs(&["0x123", "0x456"]);
        let lineups = vec![
            ContestLineup::ranked("0x123", 2.0, "1"),
            ContestLineup::ranked("0x456", 1.0, "2"),
        ];

        let first = calculate_payouts(&lineups, &participants).unwrap();
        let second = calculate_payouts(&lineups, &participants).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_lineups_have_no_winner() {
        let participants = addrs(&["0x123", "0x456"]);
        let err = calculate_payouts(&[], &participants).unwrap_err();
        assert_eq!(err, PayoutError::NoWinner);
        assert_eq!(err.to_string(), "no lineup found with position 1");
    }

    #[test]
    fn winner_missing_from_participants_is_named() {
        let participants = addrs(&["0x123", "0x456"]);
        let lineups = vec![ContestLineup::ranked("0x999", 1.0, "1")];

        let err = calculate_payouts(&lineups, &participants).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Winner 0x999 is not among the on-chain participants"
        );
    }

    #[test]
    fn lower_tier_missing_from_participants_is_named() {
        let participants = ten_participants();
        let lineups = vec![
            ContestLineup::ranked(&participants[0], 3.0, "1"),
            ContestLineup::ranked(&participants[1], 2.0, "2"),
            ContestLineup::ranked("0xdead", 1.0, "3"),
        ];

        let err = calculate_payouts(&lineups, &participants).unwrap_err();
        assert_eq!(
            err,
            PayoutError::NotAParticipant {
                placement: "Third place".to_string(),
                wallet: "0xdead".to_string(),
            }
        );
    }

    #[test]
    fn non_paying_position_need_not_be_a_participant() {
        let participants = addrs(&["0x123", "0x456"]);
        let lineups = vec![
            ContestLineup::ranked("0x123", 2.0, "1"),
            ContestLineup::ranked("0xgone", 1.0, "2"),
        ];

        assert_eq!(
            calculate_payouts(&lineups, &participants).unwrap(),
            vec![10_000, 0]
        );
    }

    #[test]
    fn missing_fields_are_integrity_errors() {
        let participants = addrs(&["0x123"]);

        let mut no_position = ContestLineup::ranked("0x123", 1.0, "1");
        no_position.position = None;
        assert_eq!(
            calculate_payouts(&[no_position], &participants).unwrap_err(),
            PayoutError::MissingField {
                index: 0,
                field: "position"
            }
        );

        let mut no_user = ContestLineup::ranked("0x123", 1.0, "1");
        no_user.user = None;
        assert_eq!(
            calculate_payouts(&[no_user], &participants).unwrap_err(),
            PayoutError::MissingField {
                index: 0,
                field: "user"
            }
        );

        let mut no_wallet = ContestLineup::ranked("0x123", 1.0, "1");
        no_wallet.user = Some(LineupUser {
            wallet_address: None,
        });
        assert_eq!(
            calculate_payouts(&[no_wallet], &participants).unwrap_err(),
            PayoutError::MissingField {
                index: 0,
                field: "user.walletAddress"
            }
        );
    }

    #[test]
    fn placement_names() {
        assert_eq!(placement_name("1"), "Winner");
        assert_eq!(placement_name("2"), "Second place");
        assert_eq!(placement_name("3"), "Third place");
        assert_eq!(placement_name("4"), "4 place");
    }
}
