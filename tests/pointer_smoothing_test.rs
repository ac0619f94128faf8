use cgmath::{InnerSpace, Vector2};
use prism::interaction::{PointerState, SMOOTHING};

#[test]
fn should_converge_toward_a_held_target_without_overshoot() {
    let mut pointer = PointerState::new();
    pointer.target = Vector2::new(1.2, -0.7);

    let mut previous_distance = (pointer.target - pointer.current).magnitude();
    for _ in 0..240 {
        pointer.advance();
        let distance = (pointer.target - pointer.current).magnitude();
        assert!(
            distance <= previous_distance,
            "distance to a held target grew from {previous_distance} to {distance}"
        );
        // The filter moves 5% of the remaining distance per frame, so the
        // current value stays on the near side of the target on both axes.
        assert!(pointer.current.x <= pointer.target.x);
        assert!(pointer.current.y >= pointer.target.y);
        previous_distance = distance;
    }
}

#[test]
fn should_match_the_closed_form_after_n_frames() {
    let target = Vector2::new(0.9, 0.4);
    let mut pointer = PointerState::new();
    pointer.target = target;

    let frames = 60;
    for _ in 0..frames {
        pointer.advance();
    }

    // current = target * (1 - (1 - rate)^N) for a fixed-rate exponential
    // smoothing filter starting at zero.
    let expected = target * (1.0 - (1.0 - SMOOTHING).powi(frames));
    assert!((pointer.current.x - expected.x).abs() < 1e-4);
    assert!((pointer.current.y - expected.y).abs() < 1e-4);
}

#[test]
fn should_normalize_pointer_positions_to_half_pi_per_side() {
    let mut pointer = PointerState::new();

    pointer.set_target(0.0, 0.0, 800, 600);
    assert!((pointer.target.x + 0.5 * std::f32::consts::PI).abs() < 1e-6);
    assert!((pointer.target.y + 0.5 * std::f32::consts::PI).abs() < 1e-6);

    pointer.set_target(800.0, 600.0, 800, 600);
    assert!((pointer.target.x - 0.5 * std::f32::consts::PI).abs() < 1e-6);
    assert!((pointer.target.y - 0.5 * std::f32::consts::PI).abs() < 1e-6);

    pointer.set_target(400.0, 300.0, 800, 600);
    assert!(pointer.target.x.abs() < 1e-6);
    assert!(pointer.target.y.abs() < 1e-6);
}

#[test]
fn should_ignore_pointer_positions_for_an_empty_window() {
    let mut pointer = PointerState::new();
    pointer.set_target(100.0, 100.0, 0, 0);
    assert_eq!(pointer.target, Vector2::new(0.0, 0.0));
}
