use partdb_core::traits::KeyValueStore;
use partdb_core::types::{Component, ComponentKind};
use partdb_match::{
    find_equivalents, find_equivalents_for_id, numeric_similarity, score, try_find_equivalents,
    Difference, MatchError, MatchOptions,
};
use partdb_store::{ComponentStore, MemoryStore};

fn part(id: &str, kind: ComponentKind, specs: &[(&str, &str)]) -> Component {
    specs
        .iter()
        .fold(Component::new(id, id.to_uppercase(), kind), |c, (k, v)| c.with_spec(*k, *v))
}

fn transistor(id: &str, specs: &[(&str, &str)]) -> Component {
    part(id, ComponentKind::Transistor, specs)
}

fn diff(parameter: &str, original: &str, equivalent: &str) -> Difference {
    Difference {
        parameter: parameter.to_string(),
        original: original.to_string(),
        equivalent: equivalent.to_string(),
    }
}

fn sample_pool() -> Vec<Component> {
    vec![
        transistor("a", &[("Vce", "40V"), ("Ic", "800mA"), ("Polarity", "NPN")])
            .with_package("TO-92"),
        transistor("b", &[("Vce", "45V"), ("Ic", "100mA"), ("Polarity", "npn")])
            .with_package("to-92"),
        transistor("c", &[("Vce", "-40V"), ("Polarity", "PNP"), ("hFE", "100 to 300")]),
        transistor("d", &[("Ic", "0mA"), ("Note", "")]).with_package("SOT-23"),
        transistor("e", &[]).with_package("TO-92"),
        transistor("f", &[("Vce", "60V"), ("Pd", "625mW"), ("Ic", "600mA")]).with_package("TO-220"),
    ]
}

#[test]
fn similarity_curve() {
    assert!((numeric_similarity(10.0, 10.0) - 1.0).abs() < 1e-12);
    assert!((numeric_similarity(10.0, 5.0) - 0.5f64.sqrt()).abs() < 1e-12);
    assert!((numeric_similarity(5.0, 10.0) - 0.5f64.sqrt()).abs() < 1e-12);
    assert!((numeric_similarity(100.0, 1.0) - 0.1).abs() < 1e-12);
    assert!((numeric_similarity(-40.0, -60.0) - (40.0f64 / 60.0).sqrt()).abs() < 1e-12);
    assert!(numeric_similarity(-3.0, 5.0).abs() < 1e-12);
    assert!(numeric_similarity(0.0, 5.0).abs() < 1e-12);
    assert!((numeric_similarity(0.0, 0.0) - 1.0).abs() < 1e-12);
}

#[test]
fn close_currents_score_97_without_a_difference() {
    let target = transistor("t", &[("Ic", "800mA")]);
    let candidate = transistor("c", &[("Ic", "750mA")]);
    let result = score(&target, &candidate);
    assert_eq!(result.match_score, 97);
    assert!(result.differences.is_empty());
    assert_eq!(result.component, candidate);
}

#[test]
fn package_mismatch_alone_scores_zero() {
    let target = transistor("t", &[]).with_package("TO-92");
    let candidate = transistor("c", &[]).with_package("TO-220");
    let result = score(&target, &candidate);
    assert_eq!(result.match_score, 0);
    assert_eq!(result.differences, vec![diff("Package", "TO-92", "TO-220")]);
}

#[test]
fn different_kinds_short_circuit() {
    let target = transistor("t", &[("Vce", "40V")]).with_package("TO-92");
    let candidate = part("c", ComponentKind::Mosfet, &[("Vce", "40V")]).with_package("TO-92");
    let result = score(&target, &candidate);
    assert_eq!(result.match_score, 0);
    assert!(result.differences.is_empty());

    let odd = part("o", ComponentKind::Other("Diode".into()), &[("Vf", "0.7V")]);
    let same_odd = part("p", ComponentKind::Other("Diode".into()), &[("Vf", "0.7V")]);
    let other_odd = part("q", ComponentKind::Other("diode".into()), &[("Vf", "0.7V")]);
    assert_eq!(score(&odd, &same_odd).match_score, 100);
    assert_eq!(score(&odd, &other_odd).match_score, 0);
}

#[test]
fn every_component_matches_itself_fully() {
    for c in sample_pool() {
        assert_eq!(score(&c, &c).match_score, 100, "self score of {}", c.id);
        assert!(score(&c, &c).differences.is_empty());
    }
}

#[test]
fn nothing_to_compare_scores_zero() {
    let bare = transistor("x", &[]);
    assert_eq!(score(&bare, &bare).match_score, 0);
}

#[test]
fn match_score_is_symmetric() {
    let pool = sample_pool();
    for a in &pool {
        for b in &pool {
            assert_eq!(
                score(a, b).match_score,
                score(b, a).match_score,
                "{} vs {}",
                a.id,
                b.id
            );
        }
    }
}

#[test]
fn text_values_compare_ignoring_case() {
    let target = transistor("t", &[("Polarity", "NPN")]);
    assert_eq!(score(&target, &transistor("c", &[("Polarity", "npn")])).match_score, 100);

    let result = score(&target, &transistor("c", &[("Polarity", "PNP")]));
    assert_eq!(result.match_score, 20);
    assert_eq!(result.differences, vec![diff("Polarity", "NPN", "PNP")]);

    let mixed = score(&transistor("t", &[("Vce", "5V")]), &transistor("c", &[("Vce", "five")]));
    assert_eq!(mixed.match_score, 20);
}

#[test]
fn one_sided_parameters_are_reported_for_the_target_only() {
    let target = transistor("t", &[("Vce", "40V"), ("Pd", "625mW")]);
    let candidate = transistor("c", &[("Vce", "40V")]);

    let forward = score(&target, &candidate);
    assert_eq!(forward.match_score, 67);
    assert_eq!(forward.differences, vec![diff("Pd", "625mW", "Not specified")]);

    let backward = score(&candidate, &target);
    assert_eq!(backward.match_score, 67);
    assert!(backward.differences.is_empty());
}

#[test]
fn distant_numbers_are_reported_with_raw_values() {
    let target = transistor("t", &[("Ic", "800mA"), ("Vce", "40V to 32V")]);
    let candidate = transistor("c", &[("Ic", "200mA"), ("Vce", "38V")]);
    let result = score(&target, &candidate);
    // Ic: sqrt(0.25) = 0.5, Vce: sqrt(38/40) ≈ 0.975
    assert_eq!(result.match_score, 74);
    assert_eq!(result.differences, vec![diff("Ic", "800mA", "200mA")]);
}

#[test]
fn find_equivalents_filters_sorts_and_excludes_target() {
    let pool = sample_pool();
    let target = pool[0].clone();
    let mut candidates = pool.clone();
    candidates.push(part("m", ComponentKind::Mosfet, &[("Vce", "40V")]).with_package("TO-92"));

    let results = find_equivalents(&target, &candidates, 0);
    assert!(results.iter().all(|r| r.component.id != "a"));
    assert!(results.iter().all(|r| r.component.kind == ComponentKind::Transistor));
    assert!(results.windows(2).all(|w| w[0].match_score >= w[1].match_score));
    assert_eq!(results.len(), 5);

    let strict = find_equivalents(&target, &candidates, 60);
    assert!(strict.iter().all(|r| r.match_score >= 60));
    assert!(strict.len() < results.len());
}

#[test]
fn ties_keep_input_order() {
    let target = transistor("t", &[("Vce", "40V")]);
    let candidates: Vec<Component> =
        ["z", "y", "x"].iter().map(|id| transistor(id, &[("Vce", "40V")])).collect();
    let ids: Vec<String> =
        find_equivalents(&target, &candidates, 0).into_iter().map(|r| r.component.id).collect();
    assert_eq!(ids, vec!["z", "y", "x"]);
}

#[test]
fn candidate_pool_is_capped_before_scoring() {
    let target = transistor("t", &[("Vce", "40V")]).with_package("TO-92");
    let candidates: Vec<Component> = (0..500)
        .map(|i| transistor(&format!("c{i}"), &[("Vce", "40V")]).with_package("TO-92"))
        .collect();
    let results = find_equivalents(&target, &candidates, 0);
    assert_eq!(results.len(), 100);
    assert_eq!(results[99].component.id, "c99");

    // A perfect candidate after the first hundred same-kind entries is never scored.
    let mut pool: Vec<Component> =
        (0..100).map(|i| transistor(&format!("weak{i}"), &[("Vce", "4V")])).collect();
    pool.push(transistor("perfect", &[("Vce", "40V")]).with_package("TO-92"));
    let results = find_equivalents(&target, &pool, 0);
    assert_eq!(results.len(), 100);
    assert!(results.iter().all(|r| r.component.id != "perfect"));
    assert!(find_equivalents(&target, &pool, 50).is_empty());
}

#[test]
fn invalid_options_are_errors_strictly_and_empty_leniently() {
    let target = transistor("t", &[("Vce", "40V")]);
    let candidates = vec![transistor("c", &[("Vce", "40V")])];
    let zero_cap = MatchOptions { candidate_cap: 0, ..MatchOptions::default() };
    assert!(matches!(
        try_find_equivalents(&target, &candidates, &zero_cap),
        Err(MatchError::InvalidOptions(_))
    ));
    assert!(find_equivalents(&target, &candidates, 101).is_empty());
    assert_eq!(find_equivalents(&target, &candidates, 100).len(), 1);
}

#[test]
fn store_backed_lookup_resolves_target_then_ranks() {
    let mut store = ComponentStore::new(MemoryStore::new());
    assert!(store.save(&sample_pool()));

    let options = MatchOptions { min_score: 0, ..MatchOptions::default() };
    let (target, results) = find_equivalents_for_id(&store, "A", &options).expect("lookup");
    assert_eq!(target.id, "a");
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.component.id != "a"));

    assert!(matches!(
        find_equivalents_for_id(&store, "missing", &options),
        Err(MatchError::TargetNotFound(id)) if id == "missing"
    ));

    store.medium_mut().set("component_db_chunk_0", "[garbage").expect("set");
    assert!(matches!(find_equivalents_for_id(&store, "a", &options), Err(MatchError::Store(_))));
}

#[test]
fn results_serialize_in_camel_case() {
    let target = transistor("t", &[("Ic", "800mA")]);
    let result = score(&target, &transistor("c", &[("Ic", "100mA")]));
    let json = serde_json::to_value(&result).expect("json");
    assert_eq!(json["matchScore"], 35);
    assert_eq!(json["differences"][0]["parameter"], "Ic");
    assert_eq!(json["component"]["type"], "Transistor");
}
