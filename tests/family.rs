#![allow(missing_docs)]

use hornlog::{Error, KnowledgeBase, Predicate, QueryTerm, QueryVar, RuleVar, Term};

const LUCY: &str = "Lucy";
const THOMAS: &str = "Thomas";
const LUCAS: &str = "Lucas";
const TOMMY: &str = "Tommy";

type Kb = KnowledgeBase<&'static str>;

struct Family {
    kb: Kb,
    x: RuleVar,
    parent_child: Predicate<2>,
    child_parent: Predicate<2>,
    mother: Predicate<2>,
    son: Predicate<2>,
    same_gender: Predicate<2>,
    sibling: Predicate<2>,
    brother: Predicate<2>,
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn lit(value: &'static str) -> QueryTerm<&'static str> {
    QueryTerm::lit(value)
}

fn var(var: &QueryVar<&'static str>) -> QueryTerm<&'static str> {
    QueryTerm::var(var)
}

fn family() -> anyhow::Result<Family> {
    init_logging();
    let mut kb = KnowledgeBase::new();
    let (x, y, z) = (RuleVar::new("X"), RuleVar::new("Y"), RuleVar::new("Z"));
    let v = Term::var;

    let parent_child = kb.predicate::<2>("parentChild");
    for (parent, child) in [(LUCY, LUCAS), (THOMAS, LUCAS), (LUCY, TOMMY), (THOMAS, TOMMY)] {
        parent_child
            .atom([Term::lit(parent), Term::lit(child)])
            .fact(&mut kb)?;
    }

    let male = kb.predicate::<1>("male");
    let female = kb.predicate::<1>("female");
    male.atom([Term::lit(LUCAS)]).fact(&mut kb)?;
    male.atom([Term::lit(THOMAS)]).fact(&mut kb)?;
    female.atom([Term::lit(LUCY)]).fact(&mut kb)?;
    female.atom([Term::lit(TOMMY)]).fact(&mut kb)?;

    let child_parent = kb.predicate::<2>("childParent");
    child_parent
        .atom([v(&x), v(&y)])
        .when(&mut kb, [parent_child.atom([v(&y), v(&x)])]);

    let mother = kb.predicate::<2>("mother");
    mother.atom([v(&x), v(&y)]).when(
        &mut kb,
        [parent_child.atom([v(&x), v(&y)]), female.atom([v(&x)])],
    );

    let son = kb.predicate::<2>("son");
    son.atom([v(&x), v(&y)]).when(
        &mut kb,
        [child_parent.atom([v(&x), v(&y)]), male.atom([v(&x)])],
    );

    let same_gender = kb.predicate::<2>("sameGender");
    same_gender
        .atom([v(&x), v(&y)])
        .when(&mut kb, [male.atom([v(&x)]), male.atom([v(&y)])]);
    same_gender
        .atom([v(&x), v(&y)])
        .when(&mut kb, [female.atom([v(&x)]), female.atom([v(&y)])]);

    let sibling = kb.predicate::<2>("sibling");
    sibling.atom([v(&x), v(&y)]).when(
        &mut kb,
        [
            parent_child.atom([v(&z), v(&x)]),
            parent_child.atom([v(&z), v(&y)]),
        ],
    );

    let brother = kb.predicate::<2>("brother");
    brother.atom([v(&x), v(&y)]).when(
        &mut kb,
        [parent_child.atom([v(&z), v(&y)]), son.atom([v(&x), v(&z)])],
    );

    Ok(Family {
        kb,
        x,
        parent_child,
        child_parent,
        mother,
        son,
        same_gender,
        sibling,
        brother,
    })
}

fn count<T: PartialEq>(values: &[T], wanted: &T) -> usize {
    values.iter().filter(|value| *value == wanted).count()
}

#[test]
fn fact_with_rule_variable_is_rejected() -> anyhow::Result<()> {
    let mut f = family()?;
    let before = f.kb.facts(&f.parent_child);

    let result = f
        .parent_child
        .atom([Term::lit(LUCY), Term::var(&f.x)])
        .fact(&mut f.kb);

    assert!(matches!(result, Err(Error::FactDeclaration { position: 1, .. })));
    assert_eq!(f.kb.facts(&f.parent_child), before);
    Ok(())
}

#[test]
fn both_query_call_sites_agree() -> anyhow::Result<()> {
    let f = family()?;

    let through_kb = QueryVar::new();
    let kb_answers = f.kb.query(&f.parent_child, [lit(LUCY), var(&through_kb)]);

    let through_predicate = QueryVar::new();
    let predicate_answers = f.parent_child.query(&f.kb, [lit(LUCY), var(&through_predicate)]);

    assert_eq!(through_kb, through_predicate);
    assert_eq!(kb_answers, predicate_answers);

    let unique_kb = f.kb.query_unique(&f.sibling, [lit(LUCAS), var(&QueryVar::new())]);
    let unique_predicate = f.sibling.query_unique(&f.kb, [lit(LUCAS), var(&QueryVar::new())]);
    assert_eq!(unique_kb, unique_predicate);
    Ok(())
}

#[test]
fn fact_queries_fill_query_variables() -> anyhow::Result<()> {
    let f = family()?;

    let lucys_children = QueryVar::new();
    let answers = f.parent_child.query(&f.kb, [lit(LUCY), var(&lucys_children)]);
    assert_eq!(lucys_children.values(), vec![LUCAS, TOMMY]);
    assert!(answers.contains(&[LUCY, LUCAS]));
    assert!(answers.contains(&[LUCY, TOMMY]));
    assert!(!answers.contains(&[THOMAS, LUCAS]));

    let tommys_parents = QueryVar::new();
    let answers = f.parent_child.query(&f.kb, [var(&tommys_parents), lit(TOMMY)]);
    assert_eq!(tommys_parents.values(), vec![LUCY, THOMAS]);
    assert_eq!(answers.into_tuples(), vec![[LUCY, TOMMY], [THOMAS, TOMMY]]);
    Ok(())
}

#[test]
fn multi_variable_fact_query() -> anyhow::Result<()> {
    let f = family()?;
    let parents = QueryVar::new();
    let children = QueryVar::new();

    let answers = f.parent_child.query(&f.kb, [var(&parents), var(&children)]);

    let parents = parents.values();
    let children = children.values();
    for parent in [LUCY, THOMAS] {
        assert_eq!(count(&parents, &parent), 2);
        for child in [LUCAS, TOMMY] {
            assert_eq!(count(&children, &child), 2);
            assert!(answers.contains(&[parent, child]));
        }
    }
    Ok(())
}

#[test]
fn true_or_false_fact_queries() -> anyhow::Result<()> {
    let f = family()?;

    let yes = f.parent_child.query(&f.kb, [lit(LUCY), lit(LUCAS)]);
    assert_eq!(yes.into_tuples(), vec![[LUCY, LUCAS]]);

    let no = f.parent_child.query(&f.kb, [lit(LUCAS), lit(THOMAS)]);
    assert!(!no.success());
    assert!(no.is_empty());
    Ok(())
}

#[test]
fn single_goal_rule_query() -> anyhow::Result<()> {
    let f = family()?;
    let tommys_parents = QueryVar::new();

    let answers = f.child_parent.query(&f.kb, [lit(TOMMY), var(&tommys_parents)]);

    assert_eq!(tommys_parents.values(), vec![LUCY, THOMAS]);
    assert!(answers.contains(&[TOMMY, LUCY]));
    assert!(answers.contains(&[TOMMY, THOMAS]));
    assert!(!answers.contains(&[LUCAS, LUCY]));
    Ok(())
}

#[test]
fn conjunctive_rule_query_excludes_failed_goals() -> anyhow::Result<()> {
    let f = family()?;
    let tommys_mother = QueryVar::new();

    let answers = f.mother.query(&f.kb, [var(&tommys_mother), lit(TOMMY)]);

    assert_eq!(tommys_mother.values(), vec![LUCY]);
    assert_eq!(answers.into_tuples(), vec![[LUCY, TOMMY]]);
    Ok(())
}

#[test]
fn nested_rule_query() -> anyhow::Result<()> {
    let f = family()?;
    let lucys_sons = QueryVar::new();

    let answers = f.son.query(&f.kb, [var(&lucys_sons), lit(LUCY)]);

    assert_eq!(lucys_sons.values(), vec![LUCAS]);
    assert_eq!(answers.into_tuples(), vec![[LUCAS, LUCY]]);

    assert_eq!(
        f.son.query(&f.kb, [lit(LUCAS), lit(LUCY)]).into_tuples(),
        vec![[LUCAS, LUCY]]
    );
    assert!(!f.son.query(&f.kb, [lit(THOMAS), lit(LUCY)]).success());
    Ok(())
}

#[test]
fn disjunctive_rule_query() -> anyhow::Result<()> {
    let f = family()?;

    let like_lucy = QueryVar::new();
    let answers = f.same_gender.query(&f.kb, [lit(LUCY), var(&like_lucy)]);
    assert_eq!(like_lucy.values(), vec![LUCY, TOMMY]);
    assert_eq!(answers.into_tuples(), vec![[LUCY, LUCY], [LUCY, TOMMY]]);

    let like_lucas = QueryVar::new();
    let answers = f.same_gender.query(&f.kb, [var(&like_lucas), lit(LUCAS)]);
    assert_eq!(like_lucas.values(), vec![LUCAS, THOMAS]);
    assert_eq!(answers.into_tuples(), vec![[LUCAS, LUCAS], [THOMAS, LUCAS]]);
    Ok(())
}

#[test]
fn unique_sibling_query() -> anyhow::Result<()> {
    let f = family()?;
    let siblings = QueryVar::new();

    let answers = f.sibling.query_unique(&f.kb, [lit(LUCAS), var(&siblings)]);

    assert_eq!(siblings.values(), vec![LUCAS, TOMMY]);
    assert_eq!(answers.into_tuples(), vec![[LUCAS, LUCAS], [LUCAS, TOMMY]]);
    Ok(())
}

#[test]
fn unique_multi_variable_sibling_query() -> anyhow::Result<()> {
    let f = family()?;
    let first = QueryVar::new();
    let second = QueryVar::new();

    let answers = f.sibling.query_unique(&f.kb, [var(&first), var(&second)]);

    for collector in [&first, &second] {
        let values = collector.values();
        for name in [LUCAS, TOMMY] {
            assert_eq!(count(&values, &name), 1);
        }
    }
    assert_eq!(answers.len(), 4);
    for a in [LUCAS, TOMMY] {
        for b in [LUCAS, TOMMY] {
            assert_eq!(count(&answers, &[a, b]), 1);
        }
    }
    Ok(())
}

#[test]
fn non_unique_query_counts_every_proof() -> anyhow::Result<()> {
    let f = family()?;
    let first = QueryVar::new();
    let second = QueryVar::new();

    let answers = f.sibling.query(&f.kb, [var(&first), var(&second)]);

    for collector in [&first, &second] {
        let values = collector.values();
        for name in [LUCAS, TOMMY] {
            assert_eq!(count(&values, &name), 4);
        }
    }
    assert_eq!(answers.len(), 8);
    for a in [LUCAS, TOMMY] {
        for b in [LUCAS, TOMMY] {
            assert_eq!(count(&answers, &[a, b]), 2);
        }
    }
    Ok(())
}

#[test]
fn brother_query_through_two_rule_levels() -> anyhow::Result<()> {
    let f = family()?;

    let unique_brothers = QueryVar::new();
    let answers = f.brother.query_unique(&f.kb, [var(&unique_brothers), lit(TOMMY)]);
    assert_eq!(unique_brothers.values(), vec![LUCAS]);
    assert_eq!(answers.into_tuples(), vec![[LUCAS, TOMMY]]);

    let brothers = QueryVar::new();
    let answers = f.brother.query(&f.kb, [var(&brothers), lit(TOMMY)]);
    assert_eq!(brothers.values(), vec![LUCAS, LUCAS]);
    assert_eq!(answers.into_tuples(), vec![[LUCAS, TOMMY], [LUCAS, TOMMY]]);

    let yes = f.brother.query(&f.kb, [lit(LUCAS), lit(TOMMY)]);
    assert!(yes.success());
    assert_eq!(yes.into_tuples(), vec![[LUCAS, TOMMY], [LUCAS, TOMMY]]);

    assert!(!f.brother.query(&f.kb, [lit(THOMAS), lit(LUCY)]).success());
    Ok(())
}

#[derive(Debug, Clone)]
struct Person {
    name: &'static str,
    age: u32,
}

impl Person {
    const fn new(name: &'static str, age: u32) -> Self {
        Self { name, age }
    }
}

#[test]
fn custom_equality_policy() -> anyhow::Result<()> {
    init_logging();
    let mut kb = KnowledgeBase::with_equality(|a: &Person, b: &Person| {
        a.name == b.name && a.age == b.age
    });
    let same = |a: &Person, b: &Person| a.name == b.name && a.age == b.age;
    let contains = |values: &[Person], wanted: &Person| values.iter().any(|v| same(v, wanted));

    let lucas1 = Person::new(LUCAS, 13);
    let lucas2 = Person::new(LUCAS, 31);
    let lucy1 = Person::new(LUCY, 41);
    let lucy2 = Person::new(LUCY, 23);
    let thomas = Person::new(THOMAS, 46);
    let tommy = Person::new(TOMMY, 14);

    let parent_child = kb.predicate::<2>("parentChildEqual");
    for (parent, child) in [(&lucy1, &lucas1), (&lucy1, &tommy), (&thomas, &lucas1), (&thomas, &tommy)] {
        parent_child
            .atom([Term::lit(parent.clone()), Term::lit(child.clone())])
            .fact(&mut kb)?;
    }
    let male = kb.unnamed_predicate::<1>();
    let female = kb.unnamed_predicate::<1>();
    for person in [&lucy1, &lucy2, &tommy] {
        female.atom([Term::lit(person.clone())]).fact(&mut kb)?;
    }
    for person in [&lucas1, &lucas2, &thomas] {
        male.atom([Term::lit(person.clone())]).fact(&mut kb)?;
    }

    let (x, y, z) = (RuleVar::new("X"), RuleVar::new("Y"), RuleVar::new("Z"));
    let mother = kb.unnamed_predicate::<2>();
    mother.atom([Term::var(&x), Term::var(&y)]).when(
        &mut kb,
        [
            parent_child.atom([Term::var(&x), Term::var(&y)]),
            female.atom([Term::var(&x)]),
        ],
    );
    let sibling = kb.unnamed_predicate::<2>();
    sibling.atom([Term::var(&x), Term::var(&y)]).when(
        &mut kb,
        [
            parent_child.atom([Term::var(&z), Term::var(&x)]),
            parent_child.atom([Term::var(&z), Term::var(&y)]),
        ],
    );

    let children = QueryVar::new();
    let answers = parent_child.query(&kb, [QueryTerm::lit(lucy1.clone()), QueryTerm::var(&children)]);
    assert!(contains(&children.values(), &lucas1));
    assert!(contains(&children.values(), &tommy));
    assert!(!contains(&children.values(), &lucas2));
    assert_eq!(answers.len(), 2);
    assert!(answers.iter().all(|[parent, _]| same(parent, &lucy1)));

    let mothers = QueryVar::new();
    let answers = mother.query(&kb, [QueryTerm::var(&mothers), QueryTerm::lit(tommy.clone())]);
    assert_eq!(mothers.len(), 1);
    assert!(contains(&mothers.values(), &lucy1));
    assert!(!contains(&mothers.values(), &lucy2));
    assert!(answers
        .iter()
        .all(|[parent, child]| same(parent, &lucy1) && same(child, &tommy)));

    let first = QueryVar::new();
    let second = QueryVar::new();
    sibling.query_unique(&kb, [QueryTerm::var(&first), QueryTerm::var(&second)]);
    for collector in [&first, &second] {
        let values = collector.values();
        assert_eq!(values.len(), 2);
        assert!(contains(&values, &lucas1));
        assert!(contains(&values, &tommy));
        assert!(!contains(&values, &lucas2));
    }
    Ok(())
}
