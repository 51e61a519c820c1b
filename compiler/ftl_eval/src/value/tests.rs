#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;

fn items(value: &Value) -> Vec<Value> {
    value.collect_items().unwrap().unwrap()
}

mod ranges {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ascending_inclusive_has_end_minus_start_plus_one_items() {
        let range = RangeValue::inclusive(2, 5);
        assert_eq!(range.len(), Some(4));
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn descending_counts_down() {
        let range = RangeValue::inclusive(5, 2);
        assert!(range.is_descending());
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![5, 4, 3, 2]);
    }

    #[test]
    fn exclusive_and_length_limited() {
        assert_eq!(RangeValue::exclusive(1, 4).iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(RangeValue::exclusive(3, 3).is_empty());
        assert_eq!(RangeValue::with_length(10, 3).iter().collect::<Vec<_>>(), vec![10, 11, 12]);
        assert_eq!(RangeValue::with_length(10, -2).iter().collect::<Vec<_>>(), vec![10, 9]);
    }

    #[test]
    fn unbounded_is_indexable() {
        let range = RangeValue::unbounded(7);
        assert!(range.is_unbounded());
        assert_eq!(range.get(1000), Some(1007));
        assert_eq!(range.iter().take(2).collect::<Vec<_>>(), vec![7, 8]);
    }

    #[test]
    fn unbounded_range_does_not_collect() {
        assert!(Value::Range(RangeValue::unbounded(0)).collect_items().is_err());
    }

    #[test]
    fn extreme_bounds_do_not_overflow() {
        let range = RangeValue::inclusive(i64::MAX - 1, i64::MAX);
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![i64::MAX - 1, i64::MAX]);
        assert_eq!(RangeValue::unbounded(i64::MAX).iter().count(), 1);
    }
}

mod hashes {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insertion_order_is_kept_on_replace() {
        let mut hash = SimpleHash::new();
        hash.insert("a", Value::int(1));
        hash.insert("b", Value::int(2));
        hash.insert("a", Value::int(3));
        assert_eq!(hash.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(hash.get("a"), Some(&Value::int(3)));
    }

    #[test]
    fn merge_lets_the_right_side_win() {
        let left: SimpleHash = [("a", Value::int(1)), ("b", Value::int(2))].into_iter().collect();
        let right: SimpleHash = [("b", Value::int(9)), ("c", Value::int(3))].into_iter().collect();
        let merged = left.merged(&right);
        assert_eq!(merged.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(merged.get("b"), Some(&Value::int(9)));
    }
}

mod facets {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::model::{ScalarModel, SequenceModel};

    #[derive(Debug)]
    struct Letters;

    impl SequenceModel for Letters {
        fn get(&self, index: usize) -> ModelResult<Option<Value>> {
            Ok(["x", "y"].get(index).map(|s| Value::from(*s)))
        }

        fn size(&self) -> ModelResult<usize> {
            Ok(2)
        }
    }

    impl ScalarModel for Letters {
        fn as_str(&self) -> ModelResult<String> {
            Ok("xy".to_owned())
        }
    }

    impl TemplateModel for Letters {
        fn as_sequence(&self) -> Option<&dyn SequenceModel> {
            Some(self)
        }

        fn as_scalar(&self) -> Option<&dyn ScalarModel> {
            Some(self)
        }
    }

    #[test]
    fn host_object_exposes_several_facets() {
        let value = Value::adapted(Letters);
        assert_eq!(
            value.capabilities(),
            Capabilities::SEQUENCE | Capabilities::STRING
        );
        assert_eq!(value.as_string().unwrap().as_deref(), Some("xy"));
        assert_eq!(items(&value), vec![Value::from("x"), Value::from("y")]);
        assert_eq!(value.seq_get(5).unwrap(), None);
    }

    #[test]
    fn empty_value_is_string_sequence_and_hash() {
        let empty = Value::Empty;
        assert!(empty.has(Capabilities::STRING));
        assert!(empty.is_sequence());
        assert!(empty.is_hash());
        assert_eq!(empty.as_string().unwrap().as_deref(), Some(""));
        assert_eq!(empty.seq_size().unwrap(), Some(0));
    }

    #[test]
    fn descriptions() {
        assert_eq!(Value::int(1).type_description(), "a number");
        assert_eq!(Value::sequence(vec![]).type_description(), "a sequence");
        assert_eq!(
            Value::Macro(MacroRef {
                element: ElementId::new(0),
                is_function: true
            })
            .type_description(),
            "a function"
        );
    }

    #[test]
    fn lookup_keeps_null_distinct_from_absent() {
        assert_eq!(Lookup::from_option(None), Lookup::Null);
        assert!(!Lookup::Null.is_absent());
        assert_eq!(Lookup::Present(Value::int(1)).into_option(), Some(Value::int(1)));
    }
}
