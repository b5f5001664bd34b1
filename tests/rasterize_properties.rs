//! Properties of triangle setup that a renderer relies on.
//!
//! Random triangles use vertices on the 1/16 pixel grid, so snapping leaves them
//! unchanged and the float edge function can be compared with the integer weights.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fixraster::geometry::point_in_triangle;
use fixraster::screen::ScreenSpace;
use fixraster::{
    CullMode, OverflowPolicy, RasterizedTriangle, Rasterizer, RejectReason, Vec2, Vec4, Viewport,
    edge_function_float,
};

// Edge weights carry 8 fractional bits
const WEIGHT_STEP: f64 = 1.0 / 256.0;

fn v(x: f32, y: f32, w: f32) -> Vec4 {
    Vec4::new(x, y, 0.0, w)
}

fn grid_vertex(rng: &mut StdRng, extent: f32) -> Vec4 {
    let steps = (extent * 16.0) as i32;
    let x = rng.gen_range(-64..steps + 64) as f32 / 16.0;
    let y = rng.gen_range(-64..steps + 64) as f32 / 16.0;
    v(x, y, 1.0)
}

fn rasterize(r: &Rasterizer, verts: &[Vec4; 3]) -> Result<RasterizedTriangle, RejectReason> {
    let st = Vec2::ZERO;
    r.rasterize(&verts[0], &st, &verts[1], &st, &verts[2], &st)
}

fn pixel_center(x: u32, y: u32) -> Vec4 {
    v(x as f32 + 0.5, y as f32 + 0.5, 1.0)
}

#[test]
fn test_example_right_triangle() {
    let r = Rasterizer::new(64, 64);
    let verts = [v(0.0, 0.0, 1.0), v(10.0, 0.0, 1.0), v(0.0, 10.0, 1.0)];
    assert!(edge_function_float(&verts[0], &verts[1], &verts[2]) > 0.0);

    let tri = rasterize(&r, &verts).unwrap();
    assert_eq!((tri.bb_start_x, tri.bb_start_y), (0, 0));
    assert_eq!((tri.bb_end_x, tri.bb_end_y), (10, 10));

    let origin = pixel_center(0, 0);
    for i in 0..3 {
        let expected = edge_function_float(&verts[(i + 1) % 3], &verts[(i + 2) % 3], &origin);
        assert_eq!(tri.w_init[i] as f64 * WEIGHT_STEP, expected as f64);
    }
}

#[test]
fn test_example_coincident_vertices_rejected() {
    let r = Rasterizer::new(64, 64);
    let verts = [v(0.0, 0.0, 1.0), v(0.0, 0.0, 1.0), v(5.0, 5.0, 1.0)];
    assert_eq!(rasterize(&r, &verts), Err(RejectReason::Degenerate));
}

#[test]
fn test_collinear_rejected_under_every_cull_mode() {
    let verts = [v(1.0, 1.0, 1.0), v(5.0, 3.0, 1.0), v(9.0, 5.0, 1.0)];
    for mode in [CullMode::None, CullMode::Back, CullMode::Front] {
        let r = Rasterizer::new(64, 64).with_cull_mode(mode);
        assert_eq!(rasterize(&r, &verts), Err(RejectReason::Degenerate));
    }
}

#[test]
fn test_integer_weights_match_float_edge_function() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let r = Rasterizer::new(128, 128).with_cull_mode(CullMode::None);
    let mut checked = 0;

    for _ in 0..200 {
        let verts = [0, 1, 2].map(|_| grid_vertex(&mut rng, 128.0));
        let Ok(tri) = rasterize(&r, &verts) else { continue };
        let sign = if tri.is_clockwise() { -1.0 } else { 1.0 };

        for y in tri.bb_start_y as u32..tri.bb_end_y as u32 {
            for x in tri.bb_start_x as u32..tri.bb_end_x as u32 {
                let p = pixel_center(x, y);
                let weights = tri.weights_at(x, y);
                for i in 0..3 {
                    let expected = sign * edge_function_float(&verts[(i + 1) % 3], &verts[(i + 2) % 3], &p) as f64;
                    let got = weights[i] as f64 * WEIGHT_STEP;
                    assert!((got - expected).abs() <= WEIGHT_STEP, "edge {i} at ({x}, {y}): {got} vs {expected}");
                }
            }
        }
        checked += 1;
    }
    assert!(checked > 100);
}

#[test]
fn test_coverage_matches_float_reference_and_bounding_box() {
    let mut rng = StdRng::seed_from_u64(42);
    let r = Rasterizer::new(48, 48).with_cull_mode(CullMode::None);

    for _ in 0..100 {
        let verts = [0, 1, 2].map(|_| grid_vertex(&mut rng, 48.0));
        let Ok(tri) = rasterize(&r, &verts) else { continue };
        let [a, b, c] = verts.map(Vec4::xy);

        for y in 0..48 {
            for x in 0..48 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let reference = point_in_triangle(a, b, c, p);
                assert_eq!(tri.covers(x, y), reference, "pixel ({x}, {y}) of {verts:?}");
                if reference {
                    assert!(tri.contains(x, y));
                }
            }
        }
    }
}

#[test]
fn test_bounding_box_spans_pixel_centres() {
    let r = Rasterizer::new(64, 64);
    let verts = [v(3.0, 4.0, 1.0), v(20.0, 6.0, 1.0), v(8.0, 17.2, 1.0)];
    let tri = rasterize(&r, &verts).unwrap();
    // Centres 3.5..=19.5 and 4.5..=16.5; 17.2 snaps to 17.1875, so row 16 is the last
    assert_eq!((tri.bb_start_x, tri.bb_start_y, tri.bb_end_x, tri.bb_end_y), (3, 4, 20, 17));

    let [a, b, c] = verts.map(Vec4::xy);
    let (sx, sy, ex, ey) = (tri.bb_start_x as u32, tri.bb_start_y as u32, tri.bb_end_x as u32, tri.bb_end_y as u32);
    let outside = |x: u32, y: u32| !point_in_triangle(a, b, c, Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
    for y in 0..64 {
        assert!(outside(sx - 1, y));
        assert!(outside(ex, y));
    }
    for x in 0..64 {
        assert!(outside(x, sy - 1));
        assert!(outside(x, ey));
    }
}

#[test]
fn test_winding_reversal_never_both_accepted() {
    let mut rng = StdRng::seed_from_u64(7);
    for mode in [CullMode::Back, CullMode::Front] {
        let r = Rasterizer::new(128, 128).with_cull_mode(mode);
        for _ in 0..100 {
            let [a, b, c] = [0, 1, 2].map(|_| grid_vertex(&mut rng, 128.0));
            let forward = edge_function_float(&a, &b, &c);
            let reversed = edge_function_float(&a, &c, &b);
            assert_eq!(forward, -reversed);

            let accepted = [rasterize(&r, &[a, b, c]).is_ok(), rasterize(&r, &[a, c, b]).is_ok()];
            assert!(!(accepted[0] && accepted[1]));
        }
    }
}

#[test]
fn test_cull_modes() {
    let front = [v(0.0, 0.0, 1.0), v(10.0, 0.0, 1.0), v(0.0, 10.0, 1.0)];
    let back = [front[0], front[2], front[1]];

    let r = Rasterizer::new(64, 64);
    assert!(rasterize(&r, &front).is_ok());
    assert_eq!(rasterize(&r, &back), Err(RejectReason::Culled));

    let r = r.with_cull_mode(CullMode::Front);
    assert_eq!(rasterize(&r, &front), Err(RejectReason::Culled));
    assert!(rasterize(&r, &back).is_ok());

    // Both windings cover the same pixels
    let r = r.with_cull_mode(CullMode::None);
    let a = rasterize(&r, &front).unwrap();
    let b = rasterize(&r, &back).unwrap();
    for y in 0..12 {
        for x in 0..12 {
            assert_eq!(a.covers(x, y), b.covers(x, y));
        }
    }
}

#[test]
fn test_perspective_correct_texture_at_vertices() {
    let verts = [v(2.5, 2.5, 1.0), v(40.5, 4.5, 2.0), v(6.5, 30.5, 4.0)];
    let sts = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
    let pixels = [(2, 2), (40, 4), (6, 30)];

    let precise = Rasterizer::<16>::with_viewport(Viewport { width: 64, height: 64 });
    let tri = precise.rasterize(&verts[0], &sts[0], &verts[1], &sts[1], &verts[2], &sts[2]).unwrap();
    for ((x, y), st) in pixels.into_iter().zip(sts) {
        let got = tri.tex_coord_at(x, y).unwrap();
        assert_relative_eq!(got.x, st.x, epsilon = 0.01);
        assert_relative_eq!(got.y, st.y, epsilon = 0.01);
    }

    let tri = Rasterizer::new(64, 64)
        .rasterize(&verts[0], &sts[0], &verts[1], &sts[1], &verts[2], &sts[2])
        .unwrap();
    for ((x, y), st) in pixels.into_iter().zip(sts) {
        let got = tri.tex_coord_at(x, y).unwrap();
        assert_relative_eq!(got.x, st.x, epsilon = 0.01);
        assert_relative_eq!(got.y, st.y, epsilon = 0.01);
    }
}

#[test]
fn test_texture_recovered_for_distant_triangle() {
    let verts = [v(2.5, 2.5, 50.0), v(40.5, 4.5, 100.0), v(6.5, 30.5, 200.0)];
    let sts = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
    let tri = Rasterizer::new(64, 64)
        .rasterize(&verts[0], &sts[0], &verts[1], &sts[1], &verts[2], &sts[2])
        .unwrap();
    for ((x, y), st) in [(2, 2), (40, 4), (6, 30)].into_iter().zip(sts) {
        let got = tri.tex_coord_at(x, y).unwrap();
        assert_relative_eq!(got.x, st.x, epsilon = 0.001);
        assert_relative_eq!(got.y, st.y, epsilon = 0.001);
    }
}

#[test]
fn test_texture_and_depth_at_vertices_for_realistic_w() {
    let mut rng = StdRng::seed_from_u64(0xd15);
    let r = Rasterizer::new(128, 128).with_cull_mode(CullMode::None);
    let mut checked = 0;

    for _ in 0..300 {
        // Vertices on pixel centres so each one is sampled exactly
        let pixels: [(u32, u32); 3] = std::array::from_fn(|_| (rng.gen_range(0..128), rng.gen_range(0..128)));
        let verts = pixels.map(|(x, y)| v(x as f32 + 0.5, y as f32 + 0.5, rng.gen_range(10.0..1000.0)));
        let sts: [Vec2; 3] = std::array::from_fn(|_| Vec2::new(rng.gen_range(0.0..4.0), rng.gen_range(0.0..4.0)));
        if edge_function_float(&verts[0], &verts[1], &verts[2]).abs() < 400.0 {
            continue;
        }
        let tri = r
            .rasterize(&verts[0], &sts[0], &verts[1], &sts[1], &verts[2], &sts[2])
            .unwrap();

        for (((x, y), vert), st) in pixels.into_iter().zip(verts).zip(sts) {
            let got = tri.tex_coord_at(x, y).unwrap();
            assert_relative_eq!(got.x, st.x, epsilon = 0.01);
            assert_relative_eq!(got.y, st.y, epsilon = 0.01);

            let recip_w = tri.recip_w_at(x, y) / 4096.0;
            assert_relative_eq!(recip_w, 1.0 / vert.w as f64, max_relative = 5e-3);
        }
        checked += 1;
    }
    assert!(checked > 200);
}

#[test]
fn test_perspective_differs_from_affine() {
    // Halfway along the v0-v1 edge on screen is not halfway in texture space
    let verts = [v(0.0, 0.0, 1.0), v(64.0, 0.0, 4.0), v(0.0, 64.0, 1.0)];
    let sts = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
    let tri = Rasterizer::<16>::with_viewport(Viewport { width: 64, height: 64 })
        .rasterize(&verts[0], &sts[0], &verts[1], &sts[1], &verts[2], &sts[2])
        .unwrap();
    let s = tri.tex_coord_at(31, 0).unwrap().x;
    // s/w and 1/w are linear on screen: at x = 31.5 the exact value is ~0.2
    assert!(s < 0.3, "s = {s}");
}

#[test]
fn test_depth_is_reciprocal_w() {
    let st = Vec2::ZERO;
    let tri = Rasterizer::new(64, 64)
        .rasterize(&v(0.0, 0.0, 2.0), &st, &v(32.0, 0.0, 2.0), &st, &v(0.0, 32.0, 2.0), &st)
        .unwrap();
    assert_eq!(tri.recip_w_at(0, 0), 2048.0);
    assert_eq!(tri.recip_w_at(10, 10), 2048.0);
    assert_eq!(tri.depth_w_x_inc, 0);
}

#[test]
fn test_empty_and_offscreen_boxes_rejected() {
    let r = Rasterizer::new(64, 64);
    let between_centers = [v(0.6, 0.6, 1.0), v(1.4, 0.6, 1.0), v(0.6, 1.4, 1.0)];
    assert_eq!(rasterize(&r, &between_centers), Err(RejectReason::EmptyBoundingBox));

    let left_of_screen = [v(-50.0, -50.0, 1.0), v(-10.0, -50.0, 1.0), v(-50.0, -10.0, 1.0)];
    assert_eq!(rasterize(&r, &left_of_screen), Err(RejectReason::OutsideViewport));

    let right_of_screen = [v(100.0, 0.0, 1.0), v(120.0, 0.0, 1.0), v(100.0, 20.0, 1.0)];
    assert_eq!(rasterize(&r, &right_of_screen), Err(RejectReason::OutsideViewport));
}

#[test]
fn test_box_clipped_to_viewport() {
    let r = Rasterizer::new(32, 24);
    let tri = rasterize(&r, &[v(-20.0, -20.0, 1.0), v(100.0, -20.0, 1.0), v(-20.0, 100.0, 1.0)]).unwrap();
    assert_eq!((tri.bb_start_x, tri.bb_start_y, tri.bb_end_x, tri.bb_end_y), (0, 0, 32, 24));
    assert!(tri.covers(0, 0));
}

#[test]
fn test_thin_wide_triangle_overflows() {
    let verts = [v(0.0, 0.0, 1.0), v(4000.0, 4000.0, 1.0), v(4000.5, 3999.0, 1.0)];
    let viewport = Viewport { width: 4096, height: 4096 };

    let r = Rasterizer::<12>::with_viewport(viewport).with_cull_mode(CullMode::None);
    assert_eq!(rasterize(&r, &verts), Err(RejectReason::Overflow { field: "w" }));

    let saturating = r.with_overflow_policy(OverflowPolicy::Saturate);
    assert!(rasterize(&saturating, &verts).is_ok());
}

#[test]
fn test_weights_do_not_depend_on_frac() {
    let st = Vec2::ZERO;
    let verts = [v(0.0, 0.0, 1.0), v(1200.0, 0.0, 1.0), v(0.0, 1200.0, 1.0)];
    let viewport = Viewport { width: 2048, height: 2048 };

    let q8 = Rasterizer::<8>::with_viewport(viewport);
    let a = q8.rasterize(&verts[0], &st, &verts[1], &st, &verts[2], &st).unwrap();
    let q16 = Rasterizer::<16>::with_viewport(viewport);
    let b = q16.rasterize(&verts[0], &st, &verts[1], &st, &verts[2], &st).unwrap();

    assert_eq!(q8.frac_bits(), 8);
    assert_eq!((a.w_init, a.w_x_inc, a.w_y_inc), (b.w_init, b.w_x_inc, b.w_y_inc));
    assert!(a.covers(0, 0));
    assert!(a.covers(1198, 0));
    assert!(!a.covers(700, 700));
}

#[test]
fn test_viewport_sized_triangles_fit_default_rasterizer() {
    let half_screen = [v(0.0, 0.0, 1.0), v(1024.0, 0.0, 1.0), v(0.0, 768.0, 1.0)];
    let tri = rasterize(&Rasterizer::new(1024, 768), &half_screen).unwrap();
    assert_eq!((tri.bb_end_x, tri.bb_end_y), (1024, 768));
    assert!(tri.covers(0, 0));
    assert!(tri.covers(1022, 0));
    assert!(tri.covers(0, 766));
    assert!(!tri.covers(600, 400));

    let largest = [v(0.0, 0.0, 1.0), v(2048.0, 0.0, 1.0), v(0.0, 2048.0, 1.0)];
    assert!(rasterize(&Rasterizer::new(2048, 2048), &largest).is_ok());

    // Twice the extent is four times the weight, past the i32 range
    let too_large = [v(0.0, 0.0, 1.0), v(4096.0, 0.0, 1.0), v(0.0, 4096.0, 1.0)];
    assert_eq!(
        rasterize(&Rasterizer::new(4096, 4096), &too_large),
        Err(RejectReason::Overflow { field: "w" })
    );
}

#[test]
fn test_tiny_w_rejected() {
    let st = Vec2::ZERO;
    let r = Rasterizer::new(64, 64);
    let result = r.rasterize(&v(0.0, 0.0, 1.0), &st, &v(10.0, 0.0, 1e-6), &st, &v(0.0, 10.0, 1.0), &st);
    assert_eq!(result, Err(RejectReason::Overflow { field: "depth_w" }));
}

#[test]
fn test_distant_triangle_is_drawn() {
    let st = Vec2::ZERO;
    let w = 10_000.0;
    let tri = Rasterizer::new(64, 64)
        .rasterize(&v(0.0, 0.0, w), &st, &v(32.0, 0.0, w), &st, &v(0.0, 32.0, w), &st)
        .unwrap();
    assert!(tri.depth_w_init > 0);
    assert!(tri.tex_coord_at(1, 1).is_some());

    let mut screen = ScreenSpace::new(64, 64);
    assert!(screen.draw_triangle(&tri, None) > 0);
}

#[test]
fn test_w_beyond_fixed_range_rejected() {
    let st = Vec2::ZERO;
    let r = Rasterizer::new(64, 64);
    // Q12 holds w below 2^19
    let ok = r.rasterize(&v(0.0, 0.0, 500_000.0), &st, &v(10.0, 0.0, 1.0), &st, &v(0.0, 10.0, 1.0), &st);
    assert!(ok.is_ok());
    let result = r.rasterize(&v(0.0, 0.0, 600_000.0), &st, &v(10.0, 0.0, 1.0), &st, &v(0.0, 10.0, 1.0), &st);
    assert_eq!(result, Err(RejectReason::Overflow { field: "depth_w" }));
}
