use prism::composer::{ANGLE_STEP, RgbShift, SHIFT_AMOUNT};

#[test]
fn should_accumulate_a_fixed_angle_step_per_frame() {
    let mut shift = RgbShift::new();
    assert_eq!(shift.angle, 0.0);
    assert_eq!(shift.amount, SHIFT_AMOUNT);

    let frames = 1000;
    for _ in 0..frames {
        shift.advance();
    }

    // The angle is a plain accumulator; the shader's trigonometry wraps it,
    // the state itself never does.
    assert!((shift.angle - ANGLE_STEP * frames as f32).abs() < 1e-3);
}

#[test]
fn should_leave_the_shift_amount_fixed() {
    let mut shift = RgbShift::new();
    for _ in 0..100 {
        shift.advance();
    }
    assert_eq!(shift.amount, SHIFT_AMOUNT);
}
