use cim_mixin::{apply, has_extension, is_application_of, mix, mixin, unwrap, wrap, Class, Extension};

use proptest::prelude::*;

fn layer() -> Extension {
    Extension::new(|base: &Class| Ok(base.clone()))
}

fn marking(index: usize) -> Extension {
    let name = format!("M{index}");
    Extension::named(name.clone(), move |base: &Class| Ok(base.extend(name.clone()).build()))
}

proptest! {
    #[test]
    fn unwrap_resolves_any_depth_to_original(depth in 0usize..16) {
        let original = marking(0);
        let mut current = original.clone();
        for _ in 0..depth {
            current = wrap(&current, layer());
        }
        prop_assert!(unwrap(&current).is_same(&original));
        prop_assert!(unwrap(&original).is_same(&original));
        prop_assert_eq!(current.name(), "M0");
    }

    #[test]
    fn application_is_recognized_only_for_its_extension(count in 2usize..8, pick in 0usize..8) {
        let extensions: Vec<Extension> = (0..count).map(marking).collect();
        let chosen = pick % count;
        let derived = apply(&Class::root(), &extensions[chosen]).unwrap();

        for (index, extension) in extensions.iter().enumerate() {
            prop_assert_eq!(
                is_application_of(Some(derived.template()), extension),
                index == chosen
            );
        }
    }

    #[test]
    fn composition_order_matches_nested_application(count in 1usize..6) {
        let extensions: Vec<Extension> = (0..count).map(|i| mixin(marking(i))).collect();
        let base = Class::builder("Base").build();

        let composed = mix(Some(&base)).with(&extensions).unwrap();

        let mut nested = base.clone();
        for extension in &extensions {
            nested = extension.invoke(&nested).unwrap();
        }
        prop_assert_eq!(&composed, &nested);

        let mut names: Vec<String> = composed.ancestors().map(|c| c.name().to_string()).collect();
        names.reverse();
        let mut expected = vec!["Base".to_string()];
        expected.extend((0..count).map(|i| format!("M{i}")));
        prop_assert_eq!(names, expected);

        let obj = composed.instantiate();
        for extension in &extensions {
            prop_assert!(has_extension(Some(&obj), extension));
        }
    }
}
