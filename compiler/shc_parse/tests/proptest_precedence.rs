//! Property-based precedence tests.
//!
//! Flat operator chains without parentheses are parsed into a global
//! constant and folded; the folded value must match an independent
//! shunting-yard evaluator driven by its own precedence table.
//!
//! Typed expression trees cover the remaining levels: comparisons,
//! equality, `&&`, `||`, prefix operators and `?:`. Each tree is printed
//! with only the parentheses its shape requires, and the folded constant
//! must equal the tree's own value.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use shc_ir::{Literal, Shader};

const OPS: [&str; 10] = ["*", "/", "%", "+", "-", "<<", ">>", "&", "^", "|"];

fn precedence(op: &str) -> u8 {
    match op {
        "*" | "/" | "%" => 10,
        "+" | "-" => 9,
        "<<" | ">>" => 8,
        "&" => 5,
        "^" => 4,
        "|" => 3,
        _ => 0,
    }
}

fn apply(op: &str, l: i32, r: i32) -> Option<i32> {
    Some(match op {
        "*" => l.wrapping_mul(r),
        "/" if r != 0 => l.wrapping_div(r),
        "%" if r != 0 => l.wrapping_rem(r),
        "/" | "%" => return None,
        "+" => l.wrapping_add(r),
        "-" => l.wrapping_sub(r),
        "<<" => l.wrapping_shl((r & 31) as u32),
        ">>" => l.wrapping_shr((r & 31) as u32),
        "&" => l & r,
        "^" => l ^ r,
        "|" => l | r,
        _ => return None,
    })
}

/// Left-associative shunting-yard evaluation.
fn evaluate(operands: &[i32], ops: &[&str]) -> Option<i32> {
    let mut values = vec![operands[0]];
    let mut pending: Vec<&str> = Vec::new();
    for (op, &operand) in ops.iter().zip(&operands[1..]) {
        while let Some(&top) = pending.last() {
            if precedence(top) < precedence(op) {
                break;
            }
            pending.pop();
            let r = values.pop()?;
            let l = values.pop()?;
            values.push(apply(top, l, r)?);
        }
        pending.push(op);
        values.push(operand);
    }
    while let Some(top) = pending.pop() {
        let r = values.pop()?;
        let l = values.pop()?;
        values.push(apply(top, l, r)?);
    }
    values.pop()
}

fn chain() -> impl Strategy<Value = (Vec<i32>, Vec<&'static str>)> {
    (1usize..8).prop_flat_map(|len| {
        (
            prop::collection::vec(0i32..100, len + 1),
            prop::collection::vec(prop::sample::select(OPS.to_vec()), len),
        )
    })
}

fn render(operands: &[i32], ops: &[&str]) -> String {
    let mut text = operands[0].to_string();
    for (op, operand) in ops.iter().zip(&operands[1..]) {
        text.push_str(&format!(" {op} {operand}"));
    }
    text
}

#[derive(Clone, Debug)]
enum Expr {
    Int(i32),
    Bool(bool),
    Unary(&'static str, Box<Expr>),
    Binary(&'static str, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
}

const COMPARISONS: [&str; 6] = ["<", ">", "<=", ">=", "==", "!="];

fn binary(op: &'static str, l: Expr, r: Expr) -> Expr {
    Expr::Binary(op, Box::new(l), Box::new(r))
}

fn ternary(cond: Expr, then_expr: Expr, else_expr: Expr) -> Expr {
    Expr::Ternary(Box::new(cond), Box::new(then_expr), Box::new(else_expr))
}

fn int_expr(depth: u32) -> BoxedStrategy<Expr> {
    let leaf = (0i32..100).prop_map(Expr::Int);
    if depth == 0 {
        return leaf.boxed();
    }
    prop_oneof![
        2 => leaf,
        4 => (prop::sample::select(OPS.to_vec()), int_expr(depth - 1), int_expr(depth - 1))
            .prop_map(|(op, l, r)| binary(op, l, r)),
        1 => (prop::sample::select(vec!["-", "~"]), int_expr(depth - 1))
            .prop_map(|(op, x)| Expr::Unary(op, Box::new(x))),
        1 => (bool_expr(depth - 1), int_expr(depth - 1), int_expr(depth - 1))
            .prop_map(|(c, t, e)| ternary(c, t, e)),
    ]
    .boxed()
}

fn bool_expr(depth: u32) -> BoxedStrategy<Expr> {
    let leaf = any::<bool>().prop_map(Expr::Bool);
    if depth == 0 {
        return leaf.boxed();
    }
    prop_oneof![
        1 => leaf,
        3 => (prop::sample::select(COMPARISONS.to_vec()), int_expr(depth - 1), int_expr(depth - 1))
            .prop_map(|(op, l, r)| binary(op, l, r)),
        3 => (prop::sample::select(vec!["&&", "||"]), bool_expr(depth - 1), bool_expr(depth - 1))
            .prop_map(|(op, l, r)| binary(op, l, r)),
        1 => bool_expr(depth - 1).prop_map(|x| Expr::Unary("!", Box::new(x))),
        1 => (bool_expr(depth - 1), bool_expr(depth - 1), bool_expr(depth - 1))
            .prop_map(|(c, t, e)| ternary(c, t, e)),
    ]
    .boxed()
}

fn level(expr: &Expr) -> u8 {
    match expr {
        Expr::Int(_) | Expr::Bool(_) => 12,
        Expr::Unary(..) => 11,
        Expr::Binary(op, ..) => match *op {
            "==" | "!=" => 6,
            "<" | ">" | "<=" | ">=" => 7,
            "&&" => 2,
            "||" => 1,
            op => precedence(op),
        },
        Expr::Ternary(..) => 0,
    }
}

/// Source text with parentheses only where precedence or
/// left-associativity needs them.
fn print(expr: &Expr) -> String {
    let nested = |child: &Expr, wrap: bool| {
        if wrap {
            format!("({})", print(child))
        } else {
            print(child)
        }
    };
    match expr {
        Expr::Int(v) => v.to_string(),
        Expr::Bool(b) => b.to_string(),
        Expr::Unary(op, x) => format!("{op} {}", nested(x, level(x) < 11)),
        Expr::Binary(op, l, r) => {
            let own = level(expr);
            format!("{} {op} {}", nested(l, level(l) < own), nested(r, level(r) <= own))
        }
        Expr::Ternary(c, t, e) => format!("{} ? {} : {}", nested(c, level(c) == 0), print(t), print(e)),
    }
}

/// Value of the tree. Only the taken arm of `?:` is evaluated.
fn value(expr: &Expr) -> Option<Literal> {
    Some(match expr {
        Expr::Int(v) => Literal::Int(*v),
        Expr::Bool(b) => Literal::Bool(*b),
        Expr::Unary(op, x) => match (*op, value(x)?) {
            ("-", Literal::Int(v)) => Literal::Int(v.wrapping_neg()),
            ("~", Literal::Int(v)) => Literal::Int(!v),
            ("!", Literal::Bool(b)) => Literal::Bool(!b),
            _ => return None,
        },
        Expr::Binary(op, l, r) => match (value(l)?, value(r)?) {
            (Literal::Int(l), Literal::Int(r)) => match *op {
                "<" => Literal::Bool(l < r),
                ">" => Literal::Bool(l > r),
                "<=" => Literal::Bool(l <= r),
                ">=" => Literal::Bool(l >= r),
                "==" => Literal::Bool(l == r),
                "!=" => Literal::Bool(l != r),
                op => Literal::Int(apply(op, l, r)?),
            },
            (Literal::Bool(l), Literal::Bool(r)) => match *op {
                "&&" => Literal::Bool(l && r),
                "||" => Literal::Bool(l || r),
                _ => return None,
            },
            _ => return None,
        },
        Expr::Ternary(c, t, e) => match value(c)? {
            Literal::Bool(true) => value(t)?,
            Literal::Bool(false) => value(e)?,
            _ => return None,
        },
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn folded_chain_matches_precedence_table((operands, ops) in chain()) {
        let expected = evaluate(&operands, &ops);
        prop_assume!(expected.is_some());

        let source = format!("const int K = {};", render(&operands, &ops));
        let mut shader = Shader::new("prop");
        shc_parse::parse(&mut shader, &source).unwrap();
        let var = shader.variables.lookup(shader.interner.get("K").unwrap()).unwrap();
        prop_assert_eq!(
            shader.variables.get(var).constant,
            expected.map(Literal::Int),
            "source: {}", source
        );
    }

    #[test]
    fn folded_tree_matches_its_value(expr in int_expr(4)) {
        let expected = value(&expr);
        prop_assume!(expected.is_some());

        let source = format!("const int K = {};", print(&expr));
        let mut shader = Shader::new("prop");
        shc_parse::parse(&mut shader, &source).unwrap_or_else(|e| panic!("{source}: {e}"));
        let var = shader.variables.lookup(shader.interner.get("K").unwrap()).unwrap();
        prop_assert_eq!(shader.variables.get(var).constant, expected, "source: {}", source);
    }

    #[test]
    fn parse_never_panics(text in "[a-z0-9 (){};=+*,.]{0,60}") {
        let mut shader = Shader::new("prop");
        let _ = shc_parse::parse(&mut shader, &text);
    }
}
