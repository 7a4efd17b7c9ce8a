use scalargrad_core::autograd::{check_gradients, GradCheckConfig};
use scalargrad_core::{AutogradError, Graph};

fn main() -> Result<(), AutogradError> {
    env_logger::init();

    // z = (x + y) * (x - y) = x^2 - y^2
    let graph = Graph::new();
    let x = graph.variable(3.0);
    let y = graph.variable(2.0);
    let z = x.add(&y)?.mul(&x.sub(&y)?)?;
    z.backward()?;

    println!("z = {}", z.value());
    println!("dz/dx = {:?} (expected 6)", x.derivative());
    println!("dz/dy = {:?} (expected -4)", y.derivative());

    let config = GradCheckConfig::default();
    match check_gradients(|xs| xs[0].add(&xs[1])?.mul(&xs[0].sub(&xs[1])?), &[3.0, 2.0], &config) {
        Ok(()) => println!("gradient check passed"),
        Err(e) => println!("gradient check failed: {}", e),
    }
    Ok(())
}
