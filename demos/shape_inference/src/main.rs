// Shape Inference Demo: watching a network find its own parameter shapes
//
// Architecture: Dense(128, relu) → Dense(64, relu) → Dense(10)
// None of the layers is told its input width.
//
// This demo walks through:
//   1. Building a stack whose weights are declared as (units, ?)
//   2. Attaching an initializer before any shape is known
//   3. Feeding one batch of 784-wide inputs
//   4. Inspecting the resolved shapes and the resulting parameter count
//
// Run with RUST_LOG=debug to see every resolution step as it happens.

use std::rc::Rc;

use strata::ndarray::Array2;
use strata::prelude::*;

fn main() -> strata::Result<()> {
    env_logger::init();

    println!("=== Strata - Deferred Shape Inference ===");
    println!();

    // 1. Build the network
    let mut names = NameScope::root();
    let mut net = Sequential::new(&mut names)
        .with(Dense::new(128).with_activation(Activation::Relu))
        .with(Dense::new(64).with_activation(Activation::Relu))
        .with(Dense::new(10));

    println!("{net}");
    println!();

    // 2. Register the initializer; nothing is allocated yet
    let ctx = Context::seeded(2024);
    net.initialize(Rc::new(Normal::new(0.01)), &ctx)?;

    println!("Parameters before the first forward pass:");
    println!("{}", net.collect_parameters());
    println!();

    // 3. One batch of 64 flattened 28x28 images
    let x = Array2::<f32>::from_shape_fn((64, 784), |(i, j)| ((i * 784 + j) % 255) as f32 / 255.0);
    let y = net.forward(&x)?;
    log::info!("forward produced {:?}", y.shape());

    // 4. Shapes have been inferred layer by layer
    println!("Parameters after the first forward pass:");
    println!("{}", net.collect_parameters());
    println!();
    println!("{net}");
    println!();
    println!("Output shape: {:?}", y.shape());
    println!();
    println!("{}", ModelSummary::from_module(&net));

    // A batch with the wrong width is now rejected
    match net.forward(&Array2::zeros((1, 100))) {
        Err(e) => println!("\nWidth 100 after inference: {e}"),
        Ok(_) => println!("\nunexpected success"),
    }

    Ok(())
}
