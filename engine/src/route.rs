use serde::{Deserialize, Serialize};

use saath_common::location::GeoLocation;
use saath_common::vendor::VendorId;

/// Assumed average speed in mixed city traffic.
const AVERAGE_SPEED_KMH: f64 = 20.0;

/// One stop on a delivery route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub location: GeoLocation,
    pub vendor_id: Option<VendorId>,
    /// Distance from the previous stop, in km. None for the start point.
    pub distance_km: Option<f64>,
    /// Estimated travel time from the previous stop, in minutes.
    pub estimated_minutes: Option<i64>,
}

/// A destination to visit, optionally tagged with the vendor at that stop.
#[derive(Debug, Clone)]
pub struct Destination {
    pub location: GeoLocation,
    pub vendor_id: Option<VendorId>,
}

/// Result of nearest-neighbor route ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizedRoute {
    pub points: Vec<RoutePoint>,
    /// Total traveled distance in km, rounded to 2 decimals.
    pub total_distance_km: f64,
    /// Total estimated travel time in minutes.
    pub total_minutes: i64,
    /// Straight-line start-to-end distance over traveled distance, as a
    /// percentage. At most 100 by construction.
    pub optimization_score: i64,
}

fn estimate_minutes(distance_km: f64) -> i64 {
    (distance_km / AVERAGE_SPEED_KMH * 60.0).round() as i64
}

/// Order delivery stops with the greedy nearest-neighbor heuristic.
///
/// At each step the closest unvisited destination (by Haversine) is appended
/// and becomes the new position. This is a local heuristic, not an optimal
/// tour; no 2-opt pass is attempted.
pub fn optimize_route(start: GeoLocation, destinations: Vec<Destination>) -> OptimizedRoute {
    if destinations.is_empty() {
        return OptimizedRoute {
            points: vec![RoutePoint {
                location: start,
                vendor_id: None,
                distance_km: None,
                estimated_minutes: None,
            }],
            total_distance_km: 0.0,
            total_minutes: 0,
            optimization_score: 100,
        };
    }

    let mut unvisited = destinations;
    let mut points = vec![RoutePoint {
        location: start.clone(),
        vendor_id: None,
        distance_km: None,
        estimated_minutes: None,
    }];
    let mut current = start.clone();
    let mut total_distance = 0.0;

    while !unvisited.is_empty() {
        let (nearest_idx, nearest_distance) = unvisited
            .iter()
            .enumerate()
            .map(|(i, d)| (i, current.distance_km(&d.location)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .expect("unvisited is non-empty");

        let next = unvisited.swap_remove(nearest_idx);
        points.push(RoutePoint {
            location: next.location.clone(),
            vendor_id: next.vendor_id,
            distance_km: Some(nearest_distance),
            estimated_minutes: Some(estimate_minutes(nearest_distance)),
        });
        total_distance += nearest_distance;
        current = next.location;
    }

    let score = if points.len() <= 2 {
        100
    } else {
        let direct = start.distance_km(&points.last().expect("route has points").location);
        (direct / total_distance * 100.0).round() as i64
    };

    OptimizedRoute {
        points,
        total_distance_km: (total_distance * 100.0).round() / 100.0,
        total_minutes: estimate_minutes(total_distance),
        optimization_score: score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dest(lat: f64, lon: f64) -> Destination {
        Destination {
            location: GeoLocation::new(lat, lon),
            vendor_id: None,
        }
    }

    #[test]
    fn empty_destinations_yield_trivial_route() {
        let start = GeoLocation::new(28.6139, 77.2090);
        let route = optimize_route(start.clone(), Vec::new());
        assert_eq!(route.points.len(), 1);
        assert_eq!(route.points[0].location, start);
        assert_eq!(route.total_distance_km, 0.0);
        assert_eq!(route.total_minutes, 0);
        assert_eq!(route.optimization_score, 100);
    }

    #[test]
    fn single_destination_is_the_direct_route() {
        let start = GeoLocation::new(28.6139, 77.2090); // Connaught Place
        let end = GeoLocation::new(28.6562, 77.2410); // Chandni Chowk
        let direct = start.distance_km(&end);

        let route = optimize_route(start, vec![dest(28.6562, 77.2410)]);
        assert_eq!(route.points.len(), 2);
        assert_eq!(route.optimization_score, 100);
        assert!((route.total_distance_km - direct).abs() < 0.01);
        assert_eq!(route.total_minutes, (direct / 20.0 * 60.0).round() as i64);
    }

    #[test]
    fn greedy_visits_the_closest_stop_first() {
        let start = GeoLocation::new(28.6139, 77.2090); // Connaught Place
        let near = (28.6562, 77.2410); // Chandni Chowk, ~5.7 km
        let far = (28.7041, 77.1025); // Azadpur, ~14 km
        let route = optimize_route(start, vec![dest(far.0, far.1), dest(near.0, near.1)]);

        assert_eq!(route.points.len(), 3);
        assert_eq!(route.points[1].location, GeoLocation::new(near.0, near.1));
        assert_eq!(route.points[2].location, GeoLocation::new(far.0, far.1));
    }

    #[test]
    fn score_never_exceeds_100() {
        let start = GeoLocation::new(28.6139, 77.2090);
        let route = optimize_route(
            start,
            vec![
                dest(28.6562, 77.2410),
                dest(28.7041, 77.1025),
                dest(28.5355, 77.3910),
            ],
        );
        assert!(route.optimization_score <= 100);
        assert!(route.optimization_score > 0);
    }

    #[test]
    fn leg_distances_sum_to_total() {
        let start = GeoLocation::new(28.6139, 77.2090);
        let route = optimize_route(
            start,
            vec![dest(28.6562, 77.2410), dest(28.7041, 77.1025)],
        );
        let legs: f64 = route.points.iter().filter_map(|p| p.distance_km).sum();
        assert!((legs - route.total_distance_km).abs() < 0.01);
    }
}
