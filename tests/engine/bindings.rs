//! Binding environment properties

use proptest::prelude::*;
use strata_engine::BindingEnv;
use strata_foundation::Node;
use strata_language::Var;

#[derive(Clone, Debug)]
enum Op {
    Bind(u32, i64),
    Push,
    Unwind,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u32..6, 0i64..4).prop_map(|(v, n)| Op::Bind(v, n)),
        1 => Just(Op::Push),
        1 => Just(Op::Unwind),
    ]
}

fn slots(env: &BindingEnv) -> Vec<Option<Node>> {
    (0..6).map(|i| env.get(Var::new(i)).cloned()).collect()
}

proptest! {
    /// Unwinding returns the environment to exactly what it was at the
    /// matching push, whatever happened in between.
    #[test]
    fn unwind_restores_the_marked_state(ops in prop::collection::vec(op(), 0..40)) {
        let mut env = BindingEnv::new(6);
        let mut saved: Vec<Vec<Option<Node>>> = Vec::new();
        for op in ops {
            match op {
                Op::Bind(v, n) => {
                    let before = env.get(Var::new(v)).cloned();
                    let ok = env.bind(Var::new(v), Node::integer(n));
                    match before {
                        Some(existing) => prop_assert_eq!(ok, existing == Node::integer(n)),
                        None => prop_assert!(ok),
                    }
                }
                Op::Push => {
                    saved.push(slots(&env));
                    env.push();
                }
                Op::Unwind => {
                    env.unwind();
                    if let Some(state) = saved.pop() {
                        prop_assert_eq!(slots(&env), state);
                    }
                }
            }
            prop_assert_eq!(env.depth(), saved.len());
        }
    }

    /// A snapshot lists exactly the bound variables.
    #[test]
    fn snapshot_lists_bound_variables(binds in prop::collection::vec((0u32..6, 0i64..4), 0..10)) {
        let mut env = BindingEnv::new(6);
        for (v, n) in &binds {
            env.bind(Var::new(*v), Node::integer(*n));
        }
        let bound = (0..6).filter(|i| env.is_bound(Var::new(*i))).count();
        prop_assert_eq!(env.snapshot().len(), bound);
    }
}

#[test]
fn out_of_range_variable_does_not_bind() {
    let mut env = BindingEnv::new(1);
    assert!(!env.bind(Var::new(3), Node::integer(1)));
    assert!(env.snapshot().is_empty());
}
