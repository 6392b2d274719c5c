//! Deterministic fallback solvers
//!
//! Produces a worked, step-by-step answer without any external model.
//! Covers the common shapes: single-variable linear equations, binary
//! arithmetic, power-rule derivatives and integrals, circle geometry,
//! and percentages, with a study-guidance template for everything else.
//!
//! Output uses the same `**Step N:**` / `**Final Answer:**` markers the
//! primary model is prompted for, so the assembler parses both the same
//! way.

use regex_lite::Regex;

pub struct FallbackSolver {
    equation: Regex,
    arithmetic: Regex,
    derivative: Regex,
    integral: Regex,
    circle: Regex,
    percentage: Regex,
}

impl Default for FallbackSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackSolver {
    pub fn new() -> Self {
        let compile = |p: &str| Regex::new(p).expect("invalid fallback pattern");
        Self {
            // ax + b = c anywhere in the question, e.g. "Solve 2x + 4 = 2"
            equation: compile(
                r"(\d*)\s*([a-z])\s*([+\-])\s*(\d+(?:\.\d+)?)\s*=\s*(-?\d+(?:\.\d+)?)",
            ),
            arithmetic: compile(r"(-?\d+(?:\.\d+)?)\s*([+\-*/×÷^])\s*(-?\d+(?:\.\d+)?)"),
            derivative: compile(r"derivative\s+of\s+(\d*)\s*([a-z])\s*\^\s*(-?\d+)"),
            integral: compile(r"integral\s+of\s+(\d*)\s*([a-z])\s*\^\s*(-?\d+)"),
            circle: compile(r"(area|circumference)\s+of\s+a?\s*circle.*?radius\s+(?:of\s+|is\s+)?(\d+(?:\.\d+)?)"),
            percentage: compile(r"(\d+(?:\.\d+)?)\s*(?:%|percent)\s+of\s+(\d+(?:\.\d+)?)"),
        }
    }

    /// Solve what can be solved deterministically; always returns an answer.
    pub fn solve(&self, question: &str) -> String {
        let lower = question.trim().to_lowercase();

        if let Some(answer) = self.solve_equation(&lower) {
            return answer;
        }
        if let Some(answer) = self.solve_derivative(&lower) {
            return answer;
        }
        if let Some(answer) = self.solve_integral(&lower) {
            return answer;
        }
        if let Some(answer) = self.solve_circle(&lower) {
            return answer;
        }
        if let Some(answer) = self.solve_percentage(&lower) {
            return answer;
        }
        if let Some(answer) = self.solve_arithmetic(&lower) {
            return answer;
        }

        general_guidance(question.trim())
    }

    fn solve_equation(&self, lower: &str) -> Option<String> {
        let caps = self.equation.captures(lower)?;

        let a: f64 = match caps.get(1).map(|m| m.as_str()).unwrap_or("") {
            "" => 1.0,
            digits => digits.parse().ok()?,
        };
        if a == 0.0 {
            return None;
        }
        let var = caps.get(2)?.as_str();
        let sign = if caps.get(3)?.as_str() == "+" { 1.0 } else { -1.0 };
        let b: f64 = caps.get(4)?.as_str().parse::<f64>().ok()? * sign;
        let c: f64 = caps.get(5)?.as_str().parse().ok()?;

        let x = (c - b) / a;
        let b_abs = fmt_num(b.abs());
        let op = if b >= 0.0 { "+" } else { "-" };
        let inverse = if b >= 0.0 { "Subtract" } else { "Add" };

        Some(format!(
            "**Step 1:** Start with the equation {a}{var} {op} {b_abs} = {c}.\n\
             **Step 2:** {inverse} {b_abs} on both sides: {a}{var} = {rhs}.\n\
             **Step 3:** Divide both sides by {a}: {var} = {x}.\n\
             **Verification:** {a}({x}) {op} {b_abs} = {c}.\n\
             **Final Answer:** {var} = {x}",
            a = fmt_num(a),
            var = var,
            op = op,
            b_abs = b_abs,
            c = fmt_num(c),
            inverse = inverse,
            rhs = fmt_num(c - b),
            x = fmt_num(x),
        ))
    }

    fn solve_arithmetic(&self, lower: &str) -> Option<String> {
        let caps = self.arithmetic.captures(lower)?;
        let lhs: f64 = caps.get(1)?.as_str().parse().ok()?;
        let op = caps.get(2)?.as_str();
        let rhs: f64 = caps.get(3)?.as_str().parse().ok()?;

        let (result, op_name) = match op {
            "+" => (lhs + rhs, "Add"),
            "-" => (lhs - rhs, "Subtract"),
            "*" | "×" => (lhs * rhs, "Multiply"),
            "/" | "÷" => {
                if rhs == 0.0 {
                    return Some(
                        "**Step 1:** The expression divides by zero.\n\
                         **Step 2:** Division by zero is undefined; no number times 0 \
                         gives a nonzero result.\n\
                         **Final Answer:** undefined (division by zero)"
                            .to_string(),
                    );
                }
                (lhs / rhs, "Divide")
            }
            "^" => (lhs.powf(rhs), "Raise"),
            _ => return None,
        };

        Some(format!(
            "**Step 1:** Identify the operation: {lhs} {op} {rhs}.\n\
             **Step 2:** {op_name} the operands: {lhs} {op} {rhs} = {result}.\n\
             **Final Answer:** {result}",
            lhs = fmt_num(lhs),
            op = op,
            rhs = fmt_num(rhs),
            op_name = op_name,
            result = fmt_num(result),
        ))
    }

    fn solve_derivative(&self, lower: &str) -> Option<String> {
        let caps = self.derivative.captures(lower)?;
        let coeff: f64 = match caps.get(1).map(|m| m.as_str()).unwrap_or("") {
            "" => 1.0,
            digits => digits.parse().ok()?,
        };
        let var = caps.get(2)?.as_str();
        let n: i64 = caps.get(3)?.as_str().parse().ok()?;

        let new_coeff = coeff * n as f64;
        let new_exp = n - 1;
        let result = render_power(new_coeff, var, new_exp);

        Some(format!(
            "**Step 1:** Apply the power rule: d/d{var}[{var}^n] = n*{var}^(n-1).\n\
             **Step 2:** Here n = {n}, so the derivative of {orig} is {result}.\n\
             **Final Answer:** {result}",
            var = var,
            n = n,
            orig = render_power(coeff, var, n),
            result = result,
        ))
    }

    fn solve_integral(&self, lower: &str) -> Option<String> {
        let caps = self.integral.captures(lower)?;
        let coeff: f64 = match caps.get(1).map(|m| m.as_str()).unwrap_or("") {
            "" => 1.0,
            digits => digits.parse().ok()?,
        };
        let var = caps.get(2)?.as_str();
        let n: i64 = caps.get(3)?.as_str().parse().ok()?;
        if n == -1 {
            return Some(format!(
                "**Step 1:** The power rule does not apply when the exponent is -1.\n\
                 **Step 2:** The integral of 1/{var} d{var} is the natural logarithm.\n\
                 **Final Answer:** ln|{var}| + C",
                var = var,
            ));
        }

        let new_exp = n + 1;
        let result = if coeff == 1.0 {
            format!("{var}^{new_exp}/{new_exp} + C")
        } else {
            format!("{}{var}^{new_exp}/{new_exp} + C", fmt_num(coeff))
        };

        Some(format!(
            "**Step 1:** Apply the power rule for integration: the integral of \
             {var}^n d{var} is {var}^(n+1)/(n+1) + C.\n\
             **Step 2:** Here n = {n}, so the integral of {orig} is {result}.\n\
             **Final Answer:** {result}",
            var = var,
            n = n,
            orig = render_power(coeff, var, n),
            result = result,
        ))
    }

    fn solve_circle(&self, lower: &str) -> Option<String> {
        let caps = self.circle.captures(lower)?;
        let which = caps.get(1)?.as_str();
        let r: f64 = caps.get(2)?.as_str().parse().ok()?;

        Some(if which == "area" {
            let area = std::f64::consts::PI * r * r;
            format!(
                "**Step 1:** The area of a circle is A = pi * r^2.\n\
                 **Step 2:** With r = {r}: A = pi * {r}^2 = {sq}*pi.\n\
                 **Final Answer:** {sq}*pi (about {approx:.2})",
                r = fmt_num(r),
                sq = fmt_num(r * r),
                approx = area,
            )
        } else {
            let circ = 2.0 * std::f64::consts::PI * r;
            format!(
                "**Step 1:** The circumference of a circle is C = 2 * pi * r.\n\
                 **Step 2:** With r = {r}: C = 2 * pi * {r} = {d}*pi.\n\
                 **Final Answer:** {d}*pi (about {approx:.2})",
                r = fmt_num(r),
                d = fmt_num(2.0 * r),
                approx = circ,
            )
        })
    }

    fn solve_percentage(&self, lower: &str) -> Option<String> {
        let caps = self.percentage.captures(lower)?;
        let pct: f64 = caps.get(1)?.as_str().parse().ok()?;
        let base: f64 = caps.get(2)?.as_str().parse().ok()?;
        let result = pct / 100.0 * base;

        Some(format!(
            "**Step 1:** Convert the percentage to a decimal: {pct}% = {dec}.\n\
             **Step 2:** Multiply by the base: {dec} * {base} = {result}.\n\
             **Final Answer:** {result}",
            pct = fmt_num(pct),
            dec = fmt_num(pct / 100.0),
            base = fmt_num(base),
            result = fmt_num(result),
        ))
    }
}

fn general_guidance(question: &str) -> String {
    format!(
        "**Step 1:** Restate the problem in your own words: \"{question}\".\n\
         **Step 2:** Identify what is given and what is asked, then pick the \
         relevant rule or formula.\n\
         **Step 3:** Work the problem one operation at a time, writing each \
         intermediate result.\n\
         **Final Answer:** Work through the steps above; verify the result by \
         substituting it back into the original problem.",
    )
}

fn render_power(coeff: f64, var: &str, exp: i64) -> String {
    match exp {
        0 => fmt_num(coeff),
        1 => {
            if coeff == 1.0 {
                var.to_string()
            } else {
                format!("{}{}", fmt_num(coeff), var)
            }
        }
        _ => {
            if coeff == 1.0 {
                format!("{}^{}", var, exp)
            } else {
                format!("{}{}^{}", fmt_num(coeff), var, exp)
            }
        }
    }
}

/// Minimal decimal rendering: integers without a fractional part, floats
/// trimmed of trailing zeros.
fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.4}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver() -> FallbackSolver {
        FallbackSolver::new()
    }

    #[test]
    fn test_linear_equation_negative_root() {
        let answer = solver().solve("Solve 2x + 4 = 2");
        assert!(answer.contains("x = -1"), "answer was:\n{}", answer);
        assert!(answer.contains("**Final Answer:**"));
    }

    #[test]
    fn test_linear_equation_positive_root() {
        let answer = solver().solve("solve 2x + 5 = 13");
        assert!(answer.contains("x = 4"));
    }

    #[test]
    fn test_linear_equation_subtraction() {
        let answer = solver().solve("3y - 6 = 9");
        assert!(answer.contains("y = 5"));
    }

    #[test]
    fn test_implicit_coefficient() {
        let answer = solver().solve("x + 7 = 10");
        assert!(answer.contains("x = 3"));
    }

    #[test]
    fn test_simple_addition() {
        let answer = solver().solve("2 + 2");
        assert!(answer.contains("**Final Answer:** 4"), "answer was:\n{}", answer);
    }

    #[test]
    fn test_what_is_phrasing() {
        let answer = solver().solve("What is 15 * 3?");
        assert!(answer.contains("45"));
    }

    #[test]
    fn test_division_by_zero() {
        let answer = solver().solve("what is 5 / 0");
        assert!(answer.contains("undefined"));
    }

    #[test]
    fn test_fractional_result() {
        let answer = solver().solve("7 / 2");
        assert!(answer.contains("3.5"));
    }

    #[test]
    fn test_derivative_power_rule() {
        let answer = solver().solve("what is the derivative of x^2");
        assert!(answer.contains("2x"), "answer was:\n{}", answer);
    }

    #[test]
    fn test_derivative_with_coefficient() {
        let answer = solver().solve("derivative of 3x^4");
        assert!(answer.contains("12x^3"));
    }

    #[test]
    fn test_integral_power_rule() {
        let answer = solver().solve("integral of x^2");
        assert!(answer.contains("x^3/3 + C"));
    }

    #[test]
    fn test_integral_reciprocal() {
        let answer = solver().solve("integral of x^-1");
        assert!(answer.contains("ln|x| + C"));
    }

    #[test]
    fn test_circle_area() {
        let answer = solver().solve("what is the area of a circle with radius 5");
        assert!(answer.contains("25*pi"));
        assert!(answer.contains("78.54"));
    }

    #[test]
    fn test_percentage() {
        let answer = solver().solve("what is 20% of 150");
        assert!(answer.contains("30"));
    }

    #[test]
    fn test_general_guidance_has_steps() {
        let answer = solver().solve("prove that the square root of two is irrational");
        assert!(answer.contains("**Step 1:**"));
        assert!(answer.contains("**Final Answer:**"));
    }
}
