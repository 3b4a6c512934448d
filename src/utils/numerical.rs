use ndarray::prelude::*;

/// Returns the derivative of a function `function` at an Array of points `origin` by Ridder's method.
/// The value `stepsize` is an initial stepsize, it need to be small, but should be an increment
/// over which the `function` changes substantially. An estimate of the error in the derivative is
/// returned. The method was developed by C.J.F Ridders in 1982 (see the original article
/// ["Accurate computation of F′(x) and F′(x) F″(x)"](https://doi.org/10.1016/S0141-1195(82)80057-0))
/// The implementation is based on the one described in the Book Numerical Recipes by
/// W. H. Press and S. A. Teukolsky.
pub fn ridders_method<F>(
    function: F,         // Function which should be differentiated
    origin: Array1<f64>, // Origin of coordinates, that are used for the function
    index: usize,        // Index for which the derivative is computed
    stepsize: f64,       // Initial step size
    con: f64,            // Rate at which the step size is contracted
    safe: f64,           // Safety check to terminate the algorithm
    maxiter: usize,      // Maximum order in Neville method
) -> (f64, f64)
where
    F: Fn(Array1<f64>) -> f64,
{
    let mut stepsize: f64 = stepsize;
    let mut step: Array1<f64> = Array1::zeros([origin.len()]);
    step[index] = 1.0;
    let con2: f64 = con.powi(2);
    let mut error: f64 = f64::INFINITY;

    let central = |h: f64| -> f64 {
        (function(&origin + &(&step * h)) - function(&origin - &(&step * h))) / (2.0 * h)
    };
    let mut table: Vec<Vec<f64>> = vec![vec![central(stepsize)]];
    let mut estimate: f64 = table[0][0];

    // Successive columns in the Neville tableau will go to smaller stepsizes and higher orders of
    // extrapolations.
    for i in 1..maxiter {
        stepsize /= con;
        table.push(vec![central(stepsize)]);

        let mut fac = con2;
        for j in 1..(i + 1) {
            let tmp: f64 = (table[i][j - 1] * fac - table[i - 1][j - 1]) / (fac - 1.0);
            table[i].push(tmp);
            fac *= con2;

            // compare each new extrapolation to one order lower, both at the present stepsize
            // and the previous one
            let current: f64 = (table[i][j] - table[i][j - 1]).abs();
            let last: f64 = (table[i][j] - table[i - 1][j - 1]).abs();
            let current_error: f64 = current.max(last);

            if current_error <= error {
                error = current_error;
                estimate = table[i][j];
            }
        }
        // If higher order is worse by a significant factor `safe`, then quit early.
        if (table[i][i] - table[i - 1][i - 1]).abs() >= safe * error {
            break;
        }
    }
    (estimate, error)
}

/// Numerical gradient of `function` at `origin` with Ridder's method.
pub fn numerical_gradient<F>(function: F, origin: Array1<f64>, stepsize: f64) -> Array1<f64>
where
    F: Fn(Array1<f64>) -> f64,
{
    (0..origin.len())
        .map(|i| ridders_method(&function, origin.clone(), i, stepsize, 1.4, 2.0, 15).0)
        .collect()
}

/// Test the gradient of a function.
/// * function: The function whose derivatives must be tested, takes one argument
/// * gradient: Computes the gradient of the function, to be tested.
/// * origin: The point at which the derivatives are computed.
/// * stepsize: The initial (maximal) step size for the finite difference method.
/// * tol: The allowed error on the derivative, relative to its magnitude (or absolute below 1).
/// The idea of this function comes from the [derivcheck](https://github.com/theochem/derivcheck)
/// Python package by T. Verstraelen.
pub fn assert_deriv<F, G>(function: F, gradient: G, origin: Array1<f64>, stepsize: f64, tol: f64)
where
    F: Fn(Array1<f64>) -> f64,
    G: Fn(Array1<f64>) -> Array1<f64>,
{
    assert!(stepsize > 0.0, "The stepsize has to be > 0.0, but it is {}", stepsize);
    let analytic_grad: Array1<f64> = gradient(origin.clone());
    let numerical_grad: Array1<f64> = numerical_gradient(&function, origin, stepsize);

    println!(
        "{: <5} {: >18} {: >18} {: <8}",
        "Index", "Analytic", "Numerical", "Correct?"
    );
    let mut correct: Vec<bool> = Vec::with_capacity(analytic_grad.len());
    for (i, (analytic, numerical)) in analytic_grad.iter().zip(numerical_grad.iter()).enumerate() {
        let ok: bool = (analytic - numerical).abs() <= tol * numerical.abs().max(1.0);
        correct.push(ok);
        println!("{: >5} {:>18.14} {:>18.14} {: >5}", i, analytic, numerical, ok);
    }
    assert!(!correct.contains(&false), "Gradient test failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    // returns the sum of the square of all elements: y = x * x
    fn simple_function(values: Array1<f64>) -> f64 {
        values.iter().fold(0.0, |n, i| n + (i.powi(2)))
    }
    // returns the gradient of the function above: y' = 2 * x
    fn simple_gradient(values: Array1<f64>) -> Array1<f64> {
        2.0 * values
    }

    #[test]
    fn assert_deriv_simple_function() {
        let data: Array1<f64> = array![1.0, 2.0, 3.0, 4.0];
        assert_deriv(simple_function, simple_gradient, data, 0.01, 1e-10);
    }

    #[test]
    fn gradient_of_a_product() {
        let f = |x: Array1<f64>| x[0].sin() * x[1].exp();
        let grad = numerical_gradient(f, array![0.3, -0.2], 0.1);
        approx::assert_abs_diff_eq!(grad[0], 0.3_f64.cos() * (-0.2_f64).exp(), epsilon = 1e-9);
        approx::assert_abs_diff_eq!(grad[1], 0.3_f64.sin() * (-0.2_f64).exp(), epsilon = 1e-9);
    }
}
