//! Common-duration selection across axes.
//!
//! The candidate durations are each axis' minimum and the right endpoints
//! of its blocked intervals. Walked in ascending order, the first
//! candidate that no axis blocks (and that clears the optional floor) is
//! the synchronized duration; the axis that contributed it is the
//! limiting one and its profile is locked in as-is.

use crate::block::Block;
use crate::profile::Profile;

/// Result of a successful synchronization.
#[derive(Debug, Clone)]
pub struct Synchronization {
    pub t_sync: f64,
    /// The axis whose feasible set determined `t_sync`; `None` when no
    /// axis is enabled.
    pub limiting_dof: Option<usize>,
    /// The limiting axis' locked-in profile.
    pub profile: Option<Profile>,
}

/// Pick the smallest duration every enabled axis can realize. Disabled
/// axes pass `None` in `blocks`.
pub fn synchronize<const DOFS: usize>(
    blocks: &[Option<Block>; DOFS],
    t_min: Option<f64>,
) -> Option<Synchronization> {
    if DOFS == 1 && t_min.is_none() {
        if let Some(block) = &blocks[0] {
            return Some(Synchronization {
                t_sync: block.t_min,
                limiting_dof: Some(0),
                profile: Some(block.p_min.clone()),
            });
        }
    }
    if blocks.iter().all(|b| b.is_none()) {
        return Some(Synchronization {
            t_sync: t_min.unwrap_or(0.0),
            limiting_dof: None,
            profile: None,
        });
    }

    // Candidate durations: {t_min, a.right, b.right} per axis plus the
    // floor itself, tested in ascending order with a stable tie-break on
    // the axis index.
    let mut candidates = vec![f64::INFINITY; 3 * DOFS + 1];
    for (dof, block) in blocks.iter().enumerate() {
        if let Some(block) = block {
            candidates[3 * dof] = block.t_min;
            candidates[3 * dof + 1] = block.a.map_or(f64::INFINITY, |i| i.right);
            candidates[3 * dof + 2] = block.b.map_or(f64::INFINITY, |i| i.right);
        }
    }
    if let Some(floor) = t_min {
        candidates[3 * DOFS] = floor;
    }
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&i, &j| candidates[i].total_cmp(&candidates[j]));

    let floor = t_min.unwrap_or(0.0);
    for idx in order {
        let t_sync = candidates[idx];
        if !t_sync.is_finite() || t_sync < floor {
            continue;
        }
        let blocked = blocks
            .iter()
            .any(|b| b.as_ref().is_some_and(|b| b.is_blocked(t_sync)));
        if blocked {
            continue;
        }

        if idx == 3 * DOFS {
            // The floor wins: no axis is limiting, every profile is
            // stretched to it.
            return Some(Synchronization {
                t_sync,
                limiting_dof: None,
                profile: None,
            });
        }

        let limiting_dof = idx / 3;
        let block = blocks[limiting_dof].as_ref()?;
        let profile = match idx % 3 {
            0 => Some(block.p_min.clone()),
            1 => block.p_a.clone(),
            _ => block.p_b.clone(),
        };
        return Some(Synchronization {
            t_sync,
            limiting_dof: Some(limiting_dof),
            profile,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Interval;

    fn block(t_min: f64) -> Block {
        Block {
            t_min,
            ..Block::default()
        }
    }

    #[test]
    fn single_dof_fast_path() {
        let blocks = [Some(block(2.5))];
        let sync = synchronize(&blocks, None).unwrap();
        assert_eq!(sync.t_sync, 2.5);
        assert_eq!(sync.limiting_dof, Some(0));
    }

    #[test]
    fn slowest_axis_limits() {
        let blocks = [Some(block(1.0)), Some(block(3.0))];
        let sync = synchronize(&blocks, None).unwrap();
        assert_eq!(sync.t_sync, 3.0);
        assert_eq!(sync.limiting_dof, Some(1));
    }

    #[test]
    fn floor_raises_duration() {
        let blocks = [Some(block(1.0))];
        let sync = synchronize(&blocks, Some(10.0)).unwrap();
        assert!(sync.t_sync >= 10.0);
    }

    #[test]
    fn blocked_interval_skips_to_right_endpoint() {
        // Axis 1's minimum falls inside axis 0's blocked interval; the
        // next candidate is that interval's right endpoint.
        let mut a = block(1.0);
        a.a = Some(Interval {
            left: 2.0,
            right: 4.0,
        });
        a.p_a = Some(Profile::default());
        let blocks = [Some(a), Some(block(3.0))];
        let sync = synchronize(&blocks, None).unwrap();
        assert_eq!(sync.t_sync, 4.0);
        assert_eq!(sync.limiting_dof, Some(0));
    }

    #[test]
    fn endpoint_candidate_is_not_blocked() {
        // A candidate exactly on an interval endpoint is feasible; on a
        // duration tie the stable order keeps the earlier candidate, here
        // axis 0's interval endpoint.
        let mut a = block(1.0);
        a.a = Some(Interval {
            left: 2.0,
            right: 3.0,
        });
        a.p_a = Some(Profile::default());
        let blocks = [Some(a), Some(block(3.0))];
        let sync = synchronize(&blocks, None).unwrap();
        assert_eq!(sync.t_sync, 3.0);
        assert_eq!(sync.limiting_dof, Some(0));
        assert!(sync.profile.is_some());
    }

    #[test]
    fn disabled_axes_are_ignored() {
        let blocks: [Option<Block>; 2] = [None, Some(block(2.0))];
        let sync = synchronize(&blocks, None).unwrap();
        assert_eq!(sync.t_sync, 2.0);
        assert_eq!(sync.limiting_dof, Some(1));
    }

    #[test]
    fn all_disabled_yields_floor() {
        let blocks: [Option<Block>; 2] = [None, None];
        let sync = synchronize(&blocks, None).unwrap();
        assert_eq!(sync.t_sync, 0.0);
        assert_eq!(sync.limiting_dof, None);
    }
}
