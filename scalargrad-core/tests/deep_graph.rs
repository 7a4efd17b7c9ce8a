use approx::assert_relative_eq;
use scalargrad_core::topological_sort;

mod common;
use common::{init_logger, isolated_graph};

#[test]
fn test_long_chain_does_not_overflow_the_stack() {
    init_logger();
    let graph = isolated_graph();
    let x = graph.variable(0.5);
    let one = graph.constant(1.0);

    let mut node = x;
    for _ in 0..200_000 {
        node = node.add(&one).unwrap();
    }
    let order = topological_sort(&node).unwrap();
    assert_eq!(order.len(), 200_001);
    assert_eq!(order[0], node);
    assert_eq!(order[order.len() - 1], x);

    node.backward().unwrap();
    assert_eq!(x.derivative(), Some(1.0));
}

#[test]
fn test_wide_fan_out_sums_every_path() {
    init_logger();
    let graph = isolated_graph();
    let x = graph.variable(2.0);

    // sum_{i=1..n} (i * x)
    let n = 1_000;
    let mut total = x.mul(&graph.constant(1.0)).unwrap();
    for i in 2..=n {
        let term = x.mul(&graph.constant(i as f64)).unwrap();
        total = total.add(&term).unwrap();
    }
    total.backward().unwrap();
    let expected = (n * (n + 1) / 2) as f64;
    assert_relative_eq!(x.derivative().unwrap(), expected);
}

#[test]
fn test_repeated_doubling_reuses_nodes() {
    // y_{k+1} = y_k + y_k, so dy_n/dx = 2^n
    init_logger();
    let graph = isolated_graph();
    let x = graph.variable(1.0);
    let mut y = x;
    for _ in 0..40 {
        y = y.add(&y).unwrap();
    }
    let order = topological_sort(&y).unwrap();
    assert_eq!(order.len(), 41);

    y.backward().unwrap();
    assert_relative_eq!(x.derivative().unwrap(), 2f64.powi(40));
}
