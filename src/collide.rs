use crate::config::CollisionConfig;
use crate::graph::GraphNode;

/// True once every node reports a non-zero measured box. Collision
/// resolution holds off until then: nominal layout sizes say nothing
/// about content-driven render sizes.
pub fn all_measured(nodes: &[GraphNode]) -> bool {
    !nodes.is_empty()
        && nodes
            .iter()
            .all(|n| n.measured.width > 0.0 && n.measured.height > 0.0)
}

#[derive(Debug, Clone, Copy)]
struct Box2 {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
    area: f32,
}

impl Box2 {
    fn of(node: &GraphNode) -> Self {
        let left = node.position.x;
        let top = node.position.y;
        let width = node.measured.width;
        let height = node.measured.height;
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
            area: width * height,
        }
    }

    fn overlap_x(&self, other: &Self) -> f32 {
        (self.right.min(other.right) - self.left.max(other.left)).max(0.0)
    }

    fn overlap_y(&self, other: &Self) -> f32 {
        (self.bottom.min(other.bottom) - self.top.max(other.top)).max(0.0)
    }

    fn overlap_area(&self, other: &Self) -> f32 {
        self.overlap_x(other) * self.overlap_y(other)
    }

    fn shifted(&self, dx: f32, dy: f32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
            area: self.area,
        }
    }
}

/// Overlap ratio of two boxes: intersection area relative to the
/// smaller box, so a small node fully covered by a large one counts
/// as 1.0.
pub fn overlap_ratio(a: &GraphNode, b: &GraphNode) -> f32 {
    let (a, b) = (Box2::of(a), Box2::of(b));
    let smaller = a.area.min(b.area);
    if smaller <= 0.0 {
        return 0.0;
    }
    a.overlap_x(&b) * a.overlap_y(&b) / smaller
}

/// Removes visual overlap between measured nodes, bounded by
/// `max_iterations` passes. Each pass scans all pairs in creation
/// order; a pair whose overlap ratio exceeds the threshold displaces
/// the later node along the axis needing the smaller move, pushed
/// past the other box by `margin`. A displacement is extended until
/// the moved box lands clear of every node it did not already
/// overlap, so no pair's overlap ever grows. Pairs at or below the
/// threshold are never touched, and hitting the iteration ceiling
/// leaves the best-effort positions in place rather than failing.
pub fn resolve_collisions(nodes: &mut [GraphNode], config: &CollisionConfig) {
    for _ in 0..config.max_iterations {
        let mut any_moved = false;

        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let a = Box2::of(&nodes[i]);
                let b = Box2::of(&nodes[j]);
                let smaller = a.area.min(b.area);
                if smaller <= 0.0 {
                    continue;
                }
                let overlap_x = a.overlap_x(&b);
                let overlap_y = a.overlap_y(&b);
                let ratio = overlap_x * overlap_y / smaller;
                if ratio <= config.overlap_threshold {
                    continue;
                }

                // The smaller of the two penetration depths is the
                // cheaper axis to separate along.
                let (dx, dy) = if overlap_x <= overlap_y {
                    let direction = if center_x(&b) >= center_x(&a) { 1.0 } else { -1.0 };
                    (direction * (overlap_x + config.margin), 0.0)
                } else {
                    let direction = if center_y(&b) >= center_y(&a) { 1.0 } else { -1.0 };
                    (0.0, direction * (overlap_y + config.margin))
                };
                let (dx, dy) = clear_landing(nodes, j, dx, dy, config.margin);
                nodes[j].position.x += dx;
                nodes[j].position.y += dy;
                any_moved = true;
            }
        }

        if !any_moved {
            break;
        }
    }
}

/// Extends a displacement along its axis until the moved box stops
/// landing on nodes whose overlap with it would grow. Knocking one
/// collision into a fresh one would leave a below-threshold overlap
/// the pass loop never revisits.
fn clear_landing(nodes: &[GraphNode], moved: usize, mut dx: f32, mut dy: f32, margin: f32) -> (f32, f32) {
    let current = Box2::of(&nodes[moved]);
    // Each extension clears one blocker in a monotone direction, so
    // one step per node suffices.
    for _ in 0..nodes.len() {
        let candidate = current.shifted(dx, dy);
        let blocker = nodes.iter().enumerate().find_map(|(k, other)| {
            if k == moved {
                return None;
            }
            let kbox = Box2::of(other);
            (candidate.overlap_area(&kbox) > current.overlap_area(&kbox) + 1e-6).then_some(kbox)
        });
        let Some(kbox) = blocker else {
            return (dx, dy);
        };
        if dx > 0.0 {
            dx += kbox.right + margin - candidate.left;
        } else if dx < 0.0 {
            dx -= candidate.right - (kbox.left - margin);
        } else if dy > 0.0 {
            dy += kbox.bottom + margin - candidate.top;
        } else {
            dy -= candidate.bottom - (kbox.top - margin);
        }
    }
    (dx, dy)
}

fn center_x(b: &Box2) -> f32 {
    (b.left + b.right) / 2.0
}

fn center_y(b: &Box2) -> f32 {
    (b.top + b.bottom) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Point, Size};

    fn node(id: &str, x: f32, y: f32, width: f32, height: f32) -> GraphNode {
        let mut node = GraphNode::shell(id, id, 0);
        node.position = Point { x, y };
        node.measured = Size { width, height };
        node
    }

    #[test]
    fn non_overlapping_nodes_stay_put() {
        let mut nodes = vec![
            node("a", 0.0, 0.0, 100.0, 40.0),
            node("b", 200.0, 0.0, 100.0, 40.0),
            node("c", 0.0, 100.0, 100.0, 40.0),
        ];
        let before: Vec<Point> = nodes.iter().map(|n| n.position).collect();
        resolve_collisions(&mut nodes, &CollisionConfig::default());
        let after: Vec<Point> = nodes.iter().map(|n| n.position).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn heavy_overlap_is_separated_below_threshold() {
        let mut nodes = vec![
            node("a", 0.0, 0.0, 100.0, 100.0),
            node("b", 10.0, 5.0, 100.0, 100.0),
        ];
        assert!(overlap_ratio(&nodes[0], &nodes[1]) > 0.5);
        resolve_collisions(&mut nodes, &CollisionConfig::default());
        assert!(overlap_ratio(&nodes[0], &nodes[1]) <= 0.5);
        // The earlier node is the anchor; only the later one moves.
        assert_eq!(nodes[0].position, Point { x: 0.0, y: 0.0 });
    }

    #[test]
    fn overlap_ratio_never_regresses() {
        let mut nodes = vec![
            node("a", 0.0, 0.0, 120.0, 60.0),
            node("b", 30.0, 10.0, 120.0, 60.0),
            node("c", 60.0, 20.0, 120.0, 60.0),
        ];
        let mut before = Vec::new();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                before.push(overlap_ratio(&nodes[i], &nodes[j]));
            }
        }
        resolve_collisions(&mut nodes, &CollisionConfig::default());
        let mut idx = 0;
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let after = overlap_ratio(&nodes[i], &nodes[j]);
                assert!(
                    after <= before[idx] + 1e-6,
                    "pair ({i},{j}) regressed: {} -> {after}",
                    before[idx]
                );
                idx += 1;
            }
        }
    }

    #[test]
    fn displacement_does_not_land_on_a_clean_neighbor() {
        // Separating a and b would naively drop b straight onto c,
        // turning a clean pair into a below-threshold overlap the
        // pass loop would never revisit.
        let mut nodes = vec![
            node("a", 0.0, 0.0, 100.0, 100.0),
            node("b", 10.0, 0.0, 100.0, 100.0),
            node("c", 190.0, 0.0, 100.0, 100.0),
        ];
        assert_eq!(overlap_ratio(&nodes[1], &nodes[2]), 0.0);
        let c_before = nodes[2].position;
        resolve_collisions(&mut nodes, &CollisionConfig::default());
        assert_eq!(overlap_ratio(&nodes[0], &nodes[1]), 0.0);
        assert_eq!(overlap_ratio(&nodes[1], &nodes[2]), 0.0);
        // The clean bystander never moved.
        assert_eq!(nodes[2].position, c_before);
    }

    #[test]
    fn below_threshold_overlap_is_tolerated() {
        // ~25% overlap of the smaller box: under the 0.5 threshold.
        let mut nodes = vec![
            node("a", 0.0, 0.0, 100.0, 100.0),
            node("b", 50.0, 50.0, 100.0, 100.0),
        ];
        let before = nodes[1].position;
        resolve_collisions(&mut nodes, &CollisionConfig::default());
        assert_eq!(nodes[1].position, before);
    }

    #[test]
    fn separation_picks_the_cheaper_axis() {
        // Tall thin overlap: cheaper to separate horizontally.
        let mut nodes = vec![
            node("a", 0.0, 0.0, 100.0, 100.0),
            node("b", 80.0, 0.0, 100.0, 100.0),
        ];
        assert!(overlap_ratio(&nodes[0], &nodes[1]) <= 0.5);
        let mut crowded = vec![
            node("a", 0.0, 0.0, 100.0, 100.0),
            node("b", 20.0, 0.0, 100.0, 100.0),
        ];
        resolve_collisions(&mut crowded, &CollisionConfig::default());
        // Moved along x only, pushed to the right of the anchor.
        assert_eq!(crowded[1].position.y, 0.0);
        assert!(crowded[1].position.x > 20.0);
    }

    #[test]
    fn iteration_ceiling_returns_best_effort() {
        let mut nodes = vec![
            node("a", 0.0, 0.0, 100.0, 100.0),
            node("b", 1.0, 1.0, 100.0, 100.0),
        ];
        let tight = CollisionConfig {
            max_iterations: 1,
            overlap_threshold: 0.0001,
            margin: 0.0,
        };
        // One pass cannot fully resolve an exact stack plus threshold
        // this tight everywhere, but it must not panic or loop.
        resolve_collisions(&mut nodes, &tight);
    }

    #[test]
    fn unmeasured_nodes_gate_resolution() {
        let measured = vec![node("a", 0.0, 0.0, 10.0, 10.0)];
        assert!(all_measured(&measured));
        let mut unmeasured = vec![node("a", 0.0, 0.0, 10.0, 10.0)];
        unmeasured[0].measured = Size::default();
        assert!(!all_measured(&unmeasured));
        assert!(!all_measured(&[]));
    }
}
