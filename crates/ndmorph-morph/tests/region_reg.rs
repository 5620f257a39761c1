//! Region splitting regression test
//!
//! Tests:
//!   (1) The padded input region never leaves R.pad(r) intersected with the input
//!   (2) Pixels outside the padded region are never read
//!   (3) Sub-regions computed alone match the full computation
//!   (4) Sequential and parallel execution agree
//!   (5) A restricted requested region limits both reads and output
//!
//! Run with:
//! ```
//! cargo test -p ndmorph-morph --test region_reg
//! ```

use ndmorph_core::{Image, Index, Region, Size};
use ndmorph_morph::{
    AnchorErodeDilate, FlatKernel, GrayscaleMorphFilter, MorphOp, ProcessingMode, RegionSplitter,
    execute,
};
use ndmorph_test::{RegParams, random_image};

fn sub_result(
    engine: &AnchorErodeDilate<u8, 2>,
    input: &Image<u8, 2>,
    sub: Region<2>,
) -> Image<u8, 2> {
    let mut out = Image::allocate(sub);
    engine
        .process_region(input, &mut out.view_mut())
        .expect("sub-region");
    out
}

#[test]
fn region_reg() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
    let mut rp = RegParams::new("region");

    let full = Region::from_size(Size([31, 27]));
    let input = random_image::<u8, 2>(full.size(), 21, 0..=255);
    let kernels = [
        FlatKernel::box_kernel(Size([2, 3])),
        FlatKernel::from_lines(vec![Index([4, 0]), Index([2, 2]), Index([-2, 2])]).expect("lines"),
        FlatKernel::from_lines(vec![Index([6, -6]), Index([0, 3])]).expect("diagonal"),
    ];
    let subs = [
        Region::new(Index([0, 0]), Size([31, 27])),
        Region::new(Index([10, 8]), Size([6, 5])),
        Region::new(Index([0, 20]), Size([4, 7])),
        Region::new(Index([28, 0]), Size([3, 1])),
        Region::new(Index([15, 13]), Size([1, 1])),
    ];

    for kernel in &kernels {
        let radius = kernel.radius();
        for op in [MorphOp::Erode, MorphOp::Dilate] {
            let engine = AnchorErodeDilate::new(kernel.clone(), op);
            let reference = sub_result(&engine, &input, full);

            for sub in subs {
                // ============================================================
                // Test 1: padded region bounds
                // ============================================================
                let padded = engine.padded_region(&sub, &input);
                let limit = sub.pad(&radius).crop(&full);
                rp.check(limit.contains_region(&padded));
                rp.check(padded.contains_region(&sub));

                // ============================================================
                // Test 2: boundary probes outside the padded region
                // ============================================================
                let expected = sub_result(&engine, &input, sub);
                for probe in [0u8, 255u8] {
                    let probed = Image::from_fn(full, |p| {
                        if padded.contains_index(&p) {
                            input.pixel_at(&p)
                        } else {
                            probe
                        }
                    });
                    rp.compare_images(&expected, &sub_result(&engine, &probed, sub));
                }

                // an input buffered only over the padded region gives the same result
                let cropped = Image::from_fn(padded, |p| input.pixel_at(&p));
                let from_cropped = sub_result(&engine, &cropped, sub);
                rp.compare_images(&expected, &from_cropped);

                // ============================================================
                // Test 3: sub-region equals the full computation
                // ============================================================
                let same = sub.iter().all(|p| expected.pixel_at(&p) == reference.pixel_at(&p));
                rp.check(same);
                if !same {
                    eprintln!("    DIFFER: sub-region {sub} radius {radius} {op:?}");
                }
            }

            // ================================================================
            // Test 4: sequential vs parallel
            // ================================================================
            for pieces in [2, 3, 7, 27] {
                let mut out = Image::allocate(full);
                let views = RegionSplitter::split(&full, pieces);
                rp.check(views.len() == pieces.min(27));
                let mode = ProcessingMode::ParallelWith(pieces);
                execute(&engine, &input, &mut out, mode).expect("parallel");
                rp.compare_images(&reference, &out);
            }
            let mut out = Image::allocate(full);
            execute(&engine, &input, &mut out, ProcessingMode::Parallel).expect("parallel");
            rp.compare_images(&reference, &out);
        }
    }

    // ====================================================================
    // Test 5: restricted requested region
    // ====================================================================
    eprintln!("  Testing a restricted requested region");
    let inner = Region::new(Index([5, 4]), Size([20, 15]));
    let mut restricted = input.clone();
    restricted.set_requested_region(inner).expect("requested region");
    let kernel = FlatKernel::box_kernel(Size([2, 2]));
    let out = GrayscaleMorphFilter::with_kernel(kernel.clone(), MorphOp::Dilate)
        .apply(&restricted)
        .expect("restricted");
    rp.check(out.buffered_region() == inner);

    let only_inner = Image::from_fn(inner, |p| input.pixel_at(&p));
    let expected = GrayscaleMorphFilter::with_kernel(kernel, MorphOp::Dilate)
        .mode(ProcessingMode::Sequential)
        .apply(&only_inner)
        .expect("inner only");
    rp.compare_images(&expected, &out);

    assert!(rp.cleanup(), "region regression test failed");
}
