use super::tests::assert_ordered;
use super::KdTree;

use proptest::prelude::*;

type P = [u8; 3];

#[derive(Clone, Debug)]
enum Op {
    Insert(P),
    Remove(P),
    Contains(P),
    Range(P, P),
    Rebuild,
}

fn point_strategy() -> impl Strategy<Value = P> + Clone {
    // A narrow coordinate range keeps ties and duplicates common.
    prop::array::uniform3(0u8..8)
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let point = point_strategy();
    let op = prop_oneof![
        40 => point.clone().prop_map(Op::Insert),
        25 => point.clone().prop_map(Op::Remove),
        20 => point.clone().prop_map(Op::Contains),
        14 => (point.clone(), point.clone()).prop_map(|(a, b)| Op::Range(a, b)),
        1 => Just(Op::Rebuild),
    ];
    prop::collection::vec(op, 0..=400)
}

fn inside(p: &P, low: &P, high: &P) -> bool {
    (0..3).all(|i| low[i] <= p[i] && p[i] <= high[i])
}

fn sorted(mut points: Vec<P>) -> Vec<P> {
    points.sort();
    points
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_with_vec_model(ops in ops_strategy()) {
        let mut tree: KdTree<3> = KdTree::new();
        let mut model: Vec<P> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(p) => {
                    tree.insert(p);
                    model.push(p);
                }
                Op::Remove(p) => {
                    let expected = match model.iter().position(|q| *q == p) {
                        Some(idx) => {
                            model.swap_remove(idx);
                            true
                        }
                        None => false,
                    };
                    prop_assert_eq!(tree.remove(&p), expected);
                    prop_assert!(!tree.contains(&p) || model.contains(&p));
                }
                Op::Contains(p) => {
                    prop_assert_eq!(tree.contains(&p), model.contains(&p));
                }
                Op::Range(a, b) => {
                    let low: P = std::array::from_fn(|i| a[i].min(b[i]));
                    let high: P = std::array::from_fn(|i| a[i].max(b[i]));
                    let expected: Vec<P> =
                        model.iter().filter(|p| inside(p, &low, &high)).copied().collect();
                    prop_assert_eq!(sorted(tree.range_search(&low, &high)), sorted(expected));
                }
                Op::Rebuild => tree.rebuild(),
            }
            prop_assert_eq!(tree.len(), model.len());
        }

        assert_ordered(&tree);
        prop_assert_eq!(sorted(tree.points()), sorted(model));
    }

    #[test]
    fn prop_build_preserves_multiset(points in prop::collection::vec(point_strategy(), 0..300)) {
        let tree = KdTree::from_points(points.iter().copied());

        assert_ordered(&tree);
        prop_assert_eq!(
            sorted(tree.range_search(&[0; 3], &[u8::MAX; 3])),
            sorted(points.clone())
        );
        for p in &points {
            prop_assert!(tree.contains(p));
        }
    }

    #[test]
    fn prop_build_and_insert_agree(points in prop::collection::vec(point_strategy(), 0..200),
                                   low in point_strategy(),
                                   high in point_strategy()) {
        let built = KdTree::from_points(points.iter().copied());
        let mut inserted = KdTree::new();
        inserted.extend(points.iter().copied());

        prop_assert_eq!(
            sorted(built.range_search(&low, &high)),
            sorted(inserted.range_search(&low, &high))
        );
    }
}
