/// Shift `lon` by whole turns until it lies within 180 degrees of `pointer_lon`.
///
/// Used to anchor an overlay on the world copy nearest to where the user
/// clicked when the map is zoomed out far enough to repeat horizontally.
/// The result differs from the input by the smallest integer multiple of 360
/// that brings it within half a turn of the pointer; a distance of exactly
/// 180 degrees is left alone.
///
/// Non-finite inputs are returned unchanged, as is any input whose shifted
/// value would not be finite or cannot be represented apart from `lon`.
pub fn wrap_toward(lon: f64, pointer_lon: f64) -> f64 {
    if !lon.is_finite() || !pointer_lon.is_finite() {
        return lon;
    }
    let diff = pointer_lon - lon;
    if diff.abs() <= 180.0 {
        return lon;
    }
    let turns = ((diff.abs() - 180.0) / 360.0).ceil().copysign(diff);
    let mut out = lon + turns * 360.0;
    // Rounding in the shift can leave the result just outside the window.
    let residual = pointer_lon - out;
    if residual.abs() > 180.0 {
        out += 360.0_f64.copysign(residual);
    }
    if !out.is_finite() || out == lon {
        return lon;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::wrap_toward;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn shifts_west_across_antimeridian() {
        assert_eq!(wrap_toward(170.0, -170.0), -190.0);
    }

    #[test]
    fn shifts_east_across_antimeridian() {
        assert_eq!(wrap_toward(-170.0, 170.0), 190.0);
    }

    #[test]
    fn nearby_click_is_untouched() {
        assert_eq!(wrap_toward(10.0, 10.0), 10.0);
        assert_eq!(wrap_toward(-30.0, 150.0), -30.0);
    }

    #[test]
    fn exactly_half_a_turn_is_untouched() {
        assert_eq!(wrap_toward(0.0, 180.0), 0.0);
    }

    #[test]
    fn far_world_copies_take_several_steps() {
        assert_eq!(wrap_toward(10.0, 1090.0), 1090.0);
        assert_eq!(wrap_toward(10.0, -700.0), -710.0);
    }

    #[test]
    fn exactly_half_a_turn_after_shifting_is_untouched() {
        assert_eq!(wrap_toward(0.0, 540.0), 360.0);
        assert_eq!(wrap_toward(0.0, -540.0), -360.0);
    }

    #[test]
    fn huge_longitudes_return_promptly() {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send((wrap_toward(1e20, 0.0), wrap_toward(0.0, -1e300)));
        });
        let (near_zero, far_west) = rx
            .recv_timeout(Duration::from_secs(3))
            .expect("wrap_toward did not return");
        assert!(near_zero.is_finite());
        assert!(near_zero.abs() < 1e20);
        assert!(far_west.is_finite());
    }

    #[test]
    fn non_finite_pointer_is_ignored() {
        assert_eq!(wrap_toward(42.0, f64::NAN), 42.0);
        assert_eq!(wrap_toward(42.0, f64::INFINITY), 42.0);
    }
}
