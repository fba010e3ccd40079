//! Drop variants: crazyhouse and bughouse.

use super::{CaptureEffect, RuleSet, Variant};

/// Crazyhouse: captured pieces change sides and go to the capturer's
/// reserve, from where they may be dropped instead of moving. A promoted
/// piece returns to the reserve as a pawn.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crazyhouse;

impl RuleSet for Crazyhouse {
    fn variant(&self) -> Variant {
        Variant::Crazyhouse
    }

    fn capture_effect(&self) -> CaptureEffect {
        CaptureEffect::ToReserve
    }

    fn allows_drops(&self) -> bool {
        true
    }
}

/// Bughouse: drops as in crazyhouse, but captured pieces go to the partner
/// on the other board. Reserves are set from outside through
/// [`Position::set_drop_count`](crate::Position::set_drop_count).
#[derive(Debug, Clone, Copy, Default)]
pub struct Bughouse;

impl RuleSet for Bughouse {
    fn variant(&self) -> Variant {
        Variant::Bughouse
    }

    fn allows_drops(&self) -> bool {
        true
    }
}
