// Property tests for shape resolution and naming

use std::collections::HashSet;
use std::rc::Rc;

use proptest::prelude::*;
use strata::ndarray::Array2;
use strata::prelude::*;

fn ones_ctx() -> (Rc<dyn Initializer>, Context) {
    (Rc::new(Ones), Context::seeded(0))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn dense_resolves_to_observed_width(
        units in 1usize..16,
        w in 1usize..32,
        w2 in 1usize..32,
        batch in 0usize..6,
    ) {
        let (init, ctx) = ones_ctx();
        let mut layer = Dense::new(units);
        layer.initialize(init, &ctx).unwrap();

        let y = layer.forward(&Array2::zeros((batch, w))).unwrap();
        prop_assert_eq!(y.dim(), (batch, units));
        prop_assert_eq!(layer.in_units(), Some(w));

        let second = layer.forward(&Array2::zeros((1, w2)));
        if w2 == w {
            prop_assert!(second.is_ok());
        } else {
            let is_mismatch = matches!(second, Err(Error::ShapeMismatch { .. }));
            prop_assert!(is_mismatch);
        }
    }

    #[test]
    fn resolve_is_idempotent_and_conflicts_otherwise(
        a in 1usize..10,
        b in 1usize..10,
        c in 1usize..10,
        d in 1usize..10,
    ) {
        let (init, ctx) = ones_ctx();
        let mut p = Parameter::new("p", vec![Dim::Unknown, Dim::Unknown]);
        p.attach_initializer(init, &ctx).unwrap();

        p.resolve((a, b)).unwrap();
        p.resolve((a, b)).unwrap();
        prop_assert_eq!(p.value().unwrap().shape(), &[a, b]);

        let again = p.resolve((c, d));
        if (c, d) == (a, b) {
            prop_assert!(again.is_ok());
        } else {
            let is_conflict = matches!(again, Err(Error::ShapeConflict { .. }));
            prop_assert!(is_conflict);
        }
    }

    #[test]
    fn stack_widths_cascade(
        widths in proptest::collection::vec(1usize..12, 1..6),
        input in 1usize..20,
    ) {
        let (init, ctx) = ones_ctx();
        let mut names = NameScope::root();
        let mut net = Sequential::new(&mut names);
        for &units in &widths {
            net.add(Dense::new(units));
        }
        net.initialize(init, &ctx).unwrap();
        prop_assert!(!net.collect_parameters().any_resolved());

        let y = net.forward(&Array2::zeros((2, input))).unwrap();
        prop_assert_eq!(y.ncols(), *widths.last().unwrap());

        let params = net.collect_parameters();
        prop_assert!(params.all_resolved());
        let mut expected_in = input;
        for (weight, &units) in params.select("_weight").into_iter().zip(&widths) {
            let shape = weight.shape().to_shape().unwrap();
            prop_assert_eq!(shape.dims(), &[units, expected_in]);
            expected_in = units;
        }
    }

    #[test]
    fn names_unique_across_stacks(stacks in 1usize..5, depth in 1usize..5) {
        let mut names = NameScope::root();
        let nets: Vec<Sequential> = (0..stacks)
            .map(|_| {
                let mut net = Sequential::new(&mut names);
                for _ in 0..depth {
                    net.add(Dense::new(3));
                }
                net
            })
            .collect();

        let mut seen = HashSet::new();
        for net in &nets {
            for name in net.collect_parameters().keys() {
                prop_assert!(seen.insert(name.to_string()), "duplicate {}", name);
            }
        }
        prop_assert_eq!(seen.len(), stacks * depth * 2);
    }
}
