use prism::{camera::Projection, context::capped_surface_size};

#[test]
fn should_track_the_new_aspect_ratio_after_a_resize() {
    let mut projection = Projection::new(800, 600, cgmath::Deg(25.0), 0.1, 1000.0);
    assert!((projection.aspect - 800.0 / 600.0).abs() < 1e-6);

    projection.resize(1920, 1080);
    assert!((projection.aspect - 1920.0 / 1080.0).abs() < 1e-6);
}

#[test]
fn should_not_scale_surfaces_at_common_pixel_ratios() {
    assert_eq!(capped_surface_size(800, 600, 1.0), (800, 600));
    assert_eq!(capped_surface_size(1920, 1080, 2.0), (1920, 1080));
}

#[test]
fn should_cap_the_pixel_ratio_at_two() {
    // A 3x display only gets a 2x surface: 2/3 of the physical size.
    assert_eq!(capped_surface_size(1200, 900, 3.0), (800, 600));
    assert_eq!(capped_surface_size(800, 600, 4.0), (400, 300));
}

#[test]
fn should_derive_matching_camera_and_surface_dimensions() {
    // Projection aspect and surface size come from the same capped
    // dimensions, so they can never disagree.
    let (width, height) = capped_surface_size(1920, 1080, 1.0);
    let projection = Projection::new(width, height, cgmath::Deg(25.0), 0.1, 1000.0);
    assert!((projection.aspect - width as f32 / height as f32).abs() < 1e-6);
}
