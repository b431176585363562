//! Overlap checks between a proposed class time and a tutor's existing blocks.

use super::domain::{BlockId, ScheduledBlock, TimeSlot, TutorId};

/// Whether `proposed` overlaps any active block of `tutor_id` on the same date.
///
/// `exclude` skips the block being edited so that moving it does not conflict with itself.
/// Back-to-back blocks (one ending exactly when the other starts) do not conflict.
pub fn has_conflict(
    existing: &[ScheduledBlock],
    tutor_id: &TutorId,
    proposed: &TimeSlot,
    exclude: Option<&BlockId>,
) -> bool {
    candidates(existing, tutor_id, proposed, exclude).any(|block| block.slot().overlaps(proposed))
}

/// Every active block of `tutor_id` overlapping `proposed`, in input order.
pub fn find_conflicts<'a>(
    existing: &'a [ScheduledBlock],
    tutor_id: &TutorId,
    proposed: &TimeSlot,
    exclude: Option<&BlockId>,
) -> Vec<&'a ScheduledBlock> {
    candidates(existing, tutor_id, proposed, exclude)
        .filter(|block| block.slot().overlaps(proposed))
        .collect()
}

fn candidates<'a, 'b>(
    existing: &'a [ScheduledBlock],
    tutor_id: &'b TutorId,
    proposed: &'b TimeSlot,
    exclude: Option<&'b BlockId>,
) -> impl Iterator<Item = &'a ScheduledBlock> + 'b
where
    'a: 'b,
{
    existing.iter().filter(move |block| {
        &block.tutor_id == tutor_id
            && block.status.is_active()
            && block.date == proposed.date
            && exclude.map_or(true, |excluded| &block.block_id != excluded)
    })
}
