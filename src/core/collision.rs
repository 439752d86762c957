use std::collections::BTreeSet;

use crate::{
    core::body::Body,
    spatial::SpatialHash,
    types::{Extent, Vec2},
};

/// Finds overlapping pairs and resolves them by swapping velocities and
/// pushing the two bodies apart along the line of centres.
///
/// Small sets are checked all-pairs in `(i, j)` order. Above
/// `broad_phase_threshold` bodies the pairs come from a [`SpatialHash`] kept
/// in step with every push, and are visited in the same order, so both paths
/// resolve exactly the same collisions.
#[derive(Debug)]
pub struct CollisionResolver {
    broad_phase_threshold: usize,
    grid: Option<SpatialHash>,
    positions: Vec<Vec2>,
    pairs: Vec<(usize, usize)>,
    queue: BTreeSet<(usize, usize)>,
    neighbors: Vec<usize>,
}

impl CollisionResolver {
    pub fn new(broad_phase_threshold: usize) -> Self {
        Self {
            broad_phase_threshold,
            grid: None,
            positions: Vec::new(),
            pairs: Vec::new(),
            queue: BTreeSet::new(),
            neighbors: Vec::new(),
        }
    }

    pub fn uses_broad_phase(&self, body_count: usize) -> bool {
        body_count > self.broad_phase_threshold
    }

    /// Resolves every colliding pair once, sequentially in pair order.
    /// Returns how many pairs collided.
    pub fn resolve(&mut self, bodies: &mut [Body]) -> usize {
        if self.uses_broad_phase(bodies.len()) {
            return self.resolve_gridded(bodies);
        }
        let mut collisions = 0;
        for i in 0..bodies.len() {
            for j in i + 1..bodies.len() {
                if resolve_at(bodies, i, j) {
                    collisions += 1;
                }
            }
        }
        collisions
    }

    /// Pairs not queued are known to be apart. A push can only create a new
    /// overlap around the body it moved, so each moved body is re-queried
    /// against the grid at its new position.
    fn resolve_gridded(&mut self, bodies: &mut [Body]) -> usize {
        let reach = bodies
            .iter()
            .map(|b| b.bounding_radius())
            .fold(0.0_f64, f64::max);
        let cell_size = (2.0 * reach).max(f64::MIN_POSITIVE);

        let grid = self
            .grid
            .get_or_insert_with(|| SpatialHash::new(cell_size));
        if grid.cell_size() != cell_size {
            grid.set_cell_size(cell_size);
        }

        self.positions.clear();
        self.positions.extend(bodies.iter().map(|b| b.pos));
        grid.candidate_pairs(&self.positions, &mut self.pairs);
        self.queue.clear();
        self.queue.extend(self.pairs.iter().copied());

        let mut collisions = 0;
        while let Some((i, j)) = self.queue.pop_first() {
            let before = [bodies[i].pos, bodies[j].pos];
            if !resolve_at(bodies, i, j) {
                continue;
            }
            collisions += 1;

            for (k, from) in [i, j].into_iter().zip(before) {
                let to = bodies[k].pos;
                if to == from {
                    continue;
                }
                grid.relocate(k, from, to);
                grid.query_neighbors(to, &mut self.neighbors);
                for &other in &self.neighbors {
                    let pair = (k.min(other), k.max(other));
                    if other != k && pair > (i, j) {
                        self.queue.insert(pair);
                    }
                }
            }
        }
        collisions
    }
}

fn resolve_at(bodies: &mut [Body], i: usize, j: usize) -> bool {
    let (left, right) = bodies.split_at_mut(j);
    resolve_pair(&mut left[i], &mut right[0])
}

/// Sum of the two extents along the line joining the centres.
fn contact_distance(a: &Body, b: &Body, delta: Vec2) -> f64 {
    a.extent_along(delta) + b.extent_along(delta)
}

/// Swaps velocities of an overlapping pair and separates them by half the
/// overlap each. Coincident centres get the swap but no push.
pub fn resolve_pair(a: &mut Body, b: &mut Body) -> bool {
    let delta = a.pos - b.pos;
    let dist_sq = delta.length_sq();
    let min_dist = contact_distance(a, b, delta);
    if dist_sq >= min_dist * min_dist {
        return false;
    }

    std::mem::swap(&mut a.vel, &mut b.vel);

    if delta != Vec2::ZERO {
        let overlap = min_dist - dist_sq.sqrt();
        let angle = delta.y.atan2(delta.x);
        let push = Vec2::from_angle(angle) * (overlap / 2.0);
        a.pos += push;
        b.pos -= push;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use crate::{
        config::LabelSpec,
        core::color::Palette,
        types::Rgb,
    };

    fn palette() -> Palette {
        Palette::new(vec![Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)]).unwrap()
    }

    fn circle(x: f64, y: f64, vx: f64, vy: f64, radius: f64) -> Body {
        Body::circle(Vec2::new(x, y), Vec2::new(vx, vy), radius, palette().phase_for(0))
    }

    fn distance(a: &Body, b: &Body) -> f64 {
        (a.pos - b.pos).length()
    }

    mod resolve_pair {
        use super::*;

        #[test]
        fn head_on_pair_swaps_velocities_exactly() {
            let mut a = circle(40.0, 50.0, 1.5, 0.0, 10.0);
            let mut b = circle(58.0, 50.0, -1.5, 0.0, 10.0);
            assert!(resolve_pair(&mut a, &mut b));
            assert_eq!(a.vel, Vec2::new(-1.5, 0.0));
            assert_eq!(b.vel, Vec2::new(1.5, 0.0));
        }

        #[test]
        fn overlapping_pair_is_pushed_to_contact() {
            let mut a = circle(5.0, 50.0, 1.0, 0.0, 10.0);
            let mut b = circle(24.0, 50.0, -1.0, 0.0, 10.0);
            assert!(resolve_pair(&mut a, &mut b));
            assert_eq!(a.vel, Vec2::new(-1.0, 0.0));
            assert_eq!(b.vel, Vec2::new(1.0, 0.0));
            assert!(distance(&a, &b) >= 20.0 - 1e-9);
            assert!((a.pos.x - 4.5).abs() < 1e-9);
            assert!((b.pos.x - 24.5).abs() < 1e-9);
        }

        #[test]
        fn diagonal_overlap_separates_along_line_of_centres() {
            let mut a = circle(10.0, 10.0, 0.0, 0.0, 5.0);
            let mut b = circle(13.0, 14.0, 0.0, 0.0, 5.0);
            assert!(resolve_pair(&mut a, &mut b));
            assert!((distance(&a, &b) - 10.0).abs() < 1e-9);
            let dir = b.pos - a.pos;
            assert!((dir.y / dir.x - 4.0 / 3.0).abs() < 1e-9);
        }

        #[test]
        fn touching_pair_does_not_collide() {
            let mut a = circle(30.0, 50.0, 1.0, 0.0, 10.0);
            let mut b = circle(50.0, 50.0, -1.0, 0.0, 10.0);
            assert!(!resolve_pair(&mut a, &mut b));
            assert_eq!(a.vel, Vec2::new(1.0, 0.0));
            assert_eq!(b.pos, Vec2::new(50.0, 50.0));
        }

        #[test]
        fn coincident_centres_swap_without_moving() {
            let mut a = circle(30.0, 30.0, 1.0, 0.0, 10.0);
            let mut b = circle(30.0, 30.0, 0.0, 1.0, 10.0);
            assert!(resolve_pair(&mut a, &mut b));
            assert_eq!(a.vel, Vec2::new(0.0, 1.0));
            assert_eq!(b.vel, Vec2::new(1.0, 0.0));
            assert_eq!(a.pos, Vec2::new(30.0, 30.0));
            assert_eq!(b.pos, Vec2::new(30.0, 30.0));
        }

        #[test]
        fn unequal_radii_use_their_sum() {
            let mut a = circle(0.0, 0.0, 0.0, 0.0, 3.0);
            let mut b = circle(0.0, 8.0, 0.0, 0.0, 6.0);
            assert!(resolve_pair(&mut a, &mut b));
            assert!((distance(&a, &b) - 9.0).abs() < 1e-9);
        }

        #[test]
        fn label_collides_using_box_extent_on_the_axis() {
            let spec = LabelSpec {
                text: "label".into(),
                half_width: 10.0,
                half_height: 2.0,
            };
            let mut label = Body::label(
                Vec2::new(50.0, 50.0),
                Vec2::new(1.0, 0.0),
                &spec,
                palette().phase_for(0),
            );
            // Above the label: vertical reach is only 2.
            let mut above = circle(50.0, 56.0, 0.0, -1.0, 3.0);
            assert!(!resolve_pair(&mut label, &mut above));
            // Beside the label: horizontal reach is 10.
            let mut beside = circle(62.0, 50.0, -1.0, 0.0, 3.0);
            assert!(resolve_pair(&mut label, &mut beside));
            assert!((distance(&label, &beside) - 13.0).abs() < 1e-9);
        }
    }

    mod resolve {
        use super::*;

        #[test]
        fn counts_each_colliding_pair() {
            let mut bodies = vec![
                circle(10.0, 10.0, 1.0, 0.0, 5.0),
                circle(18.0, 10.0, -1.0, 0.0, 5.0),
                circle(80.0, 80.0, 0.0, 1.0, 5.0),
            ];
            let mut resolver = CollisionResolver::new(32);
            assert_eq!(resolver.resolve(&mut bodies), 1);
            assert_eq!(bodies[2].vel, Vec2::new(0.0, 1.0));
        }

        #[test]
        fn triple_overlap_applies_pairs_in_order() {
            let mut bodies = vec![
                circle(50.0, 50.0, 1.0, 0.0, 5.0),
                circle(58.0, 50.0, 2.0, 0.0, 5.0),
                circle(54.0, 50.0, 3.0, 0.0, 5.0),
            ];
            let mut resolver = CollisionResolver::new(32);
            resolver.resolve(&mut bodies);
            let speeds: Vec<f64> = bodies.iter().map(|b| b.vel.x).collect();
            assert_eq!(speeds, vec![3.0, 2.0, 1.0]);
        }

        fn random_layout(rng: &mut StdRng, count: usize) -> Vec<Body> {
            (0..count)
                .map(|_| {
                    let radius = rng.gen_range(3.0..=9.0);
                    circle(
                        rng.gen_range(0.0..120.0),
                        rng.gen_range(0.0..80.0),
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                        radius,
                    )
                })
                .collect()
        }

        #[test]
        fn broad_phase_matches_all_pairs_on_crowded_layouts() {
            let mut brute = CollisionResolver::new(usize::MAX);
            let mut broad = CollisionResolver::new(32);
            assert!(!brute.uses_broad_phase(40));
            assert!(broad.uses_broad_phase(40));

            for seed in 0..500 {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut all_pairs = random_layout(&mut rng, 40);
                let mut gridded = all_pairs.clone();

                let hits_brute = brute.resolve(&mut all_pairs);
                let hits_broad = broad.resolve(&mut gridded);
                assert_eq!(hits_brute, hits_broad, "seed {seed}");
                assert_eq!(all_pairs, gridded, "seed {seed}");
            }
        }

        #[test]
        fn broad_phase_catches_overlap_created_by_a_push() {
            // Grid cells are 10 wide. 1 and 2 start two cells apart, then
            // resolving (0, 1) pushes 1 into range of 2 before (1, 2) is due.
            let mut bodies = vec![
                circle(5.0, 50.0, 0.0, 0.0, 5.0),
                circle(9.0, 50.0, 0.0, 0.0, 5.0),
                circle(20.5, 50.0, 0.0, 0.0, 5.0),
            ];
            bodies.extend((0..6).map(|k| {
                circle(200.0 + 40.0 * k as f64, 200.0, 0.0, 0.0, 5.0)
            }));
            let mut expected = bodies.clone();

            let mut broad = CollisionResolver::new(4);
            let mut brute = CollisionResolver::new(usize::MAX);
            let hits_brute = brute.resolve(&mut expected);
            assert_eq!(hits_brute, 2);
            assert_eq!(broad.resolve(&mut bodies), hits_brute);
            assert_eq!(bodies, expected);
        }

        #[test]
        fn empty_and_single_sets_are_fine() {
            let mut resolver = CollisionResolver::new(32);
            assert_eq!(resolver.resolve(&mut []), 0);
            let mut one = vec![circle(5.0, 5.0, 1.0, 1.0, 5.0)];
            assert_eq!(resolver.resolve(&mut one), 0);
        }
    }
}
