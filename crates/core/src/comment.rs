//! Match comments - the short table-talk line shown after a match
//!
//! Only the key is chosen here; the text behind each key is a host
//! localization concern. Selection is deterministic: the first rule that
//! applies wins, and pools are indexed by the move and match counters so
//! that replaying a game produces the same lines.

use serde::{Deserialize, Serialize};

use crate::types::ScoringConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentKey {
    PotOdds,
    OneMore,
    RiverMagic,
    AllIn,
    HighRoller,
    StackingChips,
    HeaterActive,
    PocketAces,
    RoyalFlush,
    ShipIt,
    Photographic,
    ReadingTells,
    EagleEyes,
    GreatFind,
    YouGotIt,
    Boom,
    Sharp,
    OnARoll,
    FullHouse,
    BadBeat,
    FloppedASet,
    SmoothCall,
    PokerFace,
    Grinding,
    CheckMate,
    NoBluff,
}

impl CommentKey {
    /// Localization key
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentKey::PotOdds => "comment_pot_odds",
            CommentKey::OneMore => "comment_one_more",
            CommentKey::RiverMagic => "comment_river_magic",
            CommentKey::AllIn => "comment_all_in",
            CommentKey::HighRoller => "comment_high_roller",
            CommentKey::StackingChips => "comment_stacking_chips",
            CommentKey::HeaterActive => "comment_heater_active",
            CommentKey::PocketAces => "comment_pocket_aces",
            CommentKey::RoyalFlush => "comment_royal_flush",
            CommentKey::ShipIt => "comment_ship_it",
            CommentKey::Photographic => "comment_photographic",
            CommentKey::ReadingTells => "comment_reading_tells",
            CommentKey::EagleEyes => "comment_eagle_eyes",
            CommentKey::GreatFind => "comment_great_find",
            CommentKey::YouGotIt => "comment_you_got_it",
            CommentKey::Boom => "comment_boom",
            CommentKey::Sharp => "comment_sharp",
            CommentKey::OnARoll => "comment_on_a_roll",
            CommentKey::FullHouse => "comment_full_house",
            CommentKey::BadBeat => "comment_bad_beat",
            CommentKey::FloppedASet => "comment_flopped_a_set",
            CommentKey::SmoothCall => "comment_smooth_call",
            CommentKey::PokerFace => "comment_poker_face",
            CommentKey::Grinding => "comment_grinding",
            CommentKey::CheckMate => "comment_check_mate",
            CommentKey::NoBluff => "comment_no_bluff",
        }
    }
}

const LAST_PAIR: [CommentKey; 2] = [CommentKey::OneMore, CommentKey::RiverMagic];

pub const DOUBLE_DOWN_COMMENTS: [CommentKey; 7] = [
    CommentKey::AllIn,
    CommentKey::HighRoller,
    CommentKey::StackingChips,
    CommentKey::HeaterActive,
    CommentKey::PocketAces,
    CommentKey::RoyalFlush,
    CommentKey::ShipIt,
];

pub const EFFICIENT_COMMENTS: [CommentKey; 3] = [
    CommentKey::Photographic,
    CommentKey::ReadingTells,
    CommentKey::EagleEyes,
];

pub const GENERAL_COMMENTS: [CommentKey; 13] = [
    CommentKey::GreatFind,
    CommentKey::YouGotIt,
    CommentKey::Boom,
    CommentKey::Sharp,
    CommentKey::OnARoll,
    CommentKey::FullHouse,
    CommentKey::BadBeat,
    CommentKey::FloppedASet,
    CommentKey::SmoothCall,
    CommentKey::PokerFace,
    CommentKey::Grinding,
    CommentKey::CheckMate,
    CommentKey::NoBluff,
];

fn pick<const N: usize>(pool: &[CommentKey; N], moves: u32, matches_found: usize) -> CommentKey {
    let index = (moves as usize).wrapping_add(matches_found) % N;
    pool[index]
}

/// Choose the comment for a match
///
/// `combo` is the streak before this match; `moves` already counts it.
pub fn generate_match_comment(
    moves: u32,
    matches_found: usize,
    total_pairs: usize,
    combo: u32,
    config: &ScoringConfig,
    is_double_down_active: bool,
) -> CommentKey {
    let divisor = config.comment_pot_odds_divisor.max(1);

    if matches_found == total_pairs / divisor {
        CommentKey::PotOdds
    } else if matches_found + 1 == total_pairs {
        pick(&LAST_PAIR, moves, matches_found)
    } else if is_double_down_active {
        pick(&DOUBLE_DOWN_COMMENTS, moves, matches_found)
    } else if combo >= config.heat_mode_threshold {
        CommentKey::HeaterActive
    } else if moves as usize <= matches_found * 2 && matches_found > 1 {
        pick(&EFFICIENT_COMMENTS, moves, matches_found)
    } else {
        pick(&GENERAL_COMMENTS, moves, matches_found)
    }
}
