use slrgen::{
    grammar::{Grammar, GrammarError, SymbolID},
    table::{ConflictKind, DefaultResolver},
    Config, Mode,
};
use slrgen_runtime::parser::{ParseError, Parser, Step};
use slrgen_tests::grammars;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn symbols(g: &Grammar, names: &str) -> Vec<SymbolID> {
    names
        .split_whitespace()
        .map(|name| {
            g.lookup(name)
                .unwrap_or_else(|| panic!("unknown symbol `{}'", name))
        })
        .collect()
}

macro_rules! define_tests {
    ($($name:ident),*$(,)?) => {$(
        #[test]
        fn $name() {
            init_tracing();
            let grammar = Grammar::define(grammars::$name).unwrap();
            eprintln!("grammar:\n{}", grammar);
            for mode in [Mode::LR0, Mode::SLR] {
                let mut config = Config::new();
                match mode {
                    Mode::LR0 => config.use_lr0(),
                    Mode::SLR => config.use_slr(),
                };
                let tables = config.generate(&grammar);
                eprintln!("{:?} tables:\n---\n{}", mode, tables.display());
            }
        }
    )*};
}

define_tests! {
    arithmetic,
    arithmetic_prec,
    g_simple1,
    g_simple2,
    g2,
    g4,
    optional_tail,
    unreachable,
}

#[test]
fn every_grammar_is_listed() {
    for (name, f) in grammars::ALL {
        let grammar = Grammar::define(*f).unwrap();
        assert!(grammar.num_productions() > 0, "{}", name);
    }
}

#[test]
fn arithmetic_accepts_sums() {
    init_tracing();
    let grammar = Grammar::define(grammars::arithmetic).unwrap();
    let tables = Config::new().generate(&grammar);

    let mut parser = Parser::new(&tables, symbols(&grammar, "ID PLUS ID PLUS ID"));
    assert!(parser.run().is_ok());
    assert!(parser.is_accepted());
    assert_eq!(parser.stack().len(), 1);
    assert_eq!(parser.stack()[0].symbol, grammar.start());
}

#[test]
fn arithmetic_rejects_a_dangling_operator() {
    init_tracing();
    let grammar = Grammar::define(grammars::arithmetic).unwrap();
    let tables = Config::new().generate(&grammar);

    let mut parser = Parser::new(&tables, symbols(&grammar, "ID PLUS"));
    let step = loop {
        match parser.step() {
            Step::Shift | Step::Goto | Step::Reduce => continue,
            step => break step,
        }
    };
    assert_eq!(step, Step::Error);
    assert_eq!(parser.next_symbol(), Some(grammar.end_of_input()));

    let mut parser = Parser::new(&tables, symbols(&grammar, "ID PLUS"));
    match parser.run() {
        Err(ParseError::Rejected { symbol, .. }) => {
            assert_eq!(symbol, Some(grammar.end_of_input()))
        }
        Ok(()) => panic!("accepted `ID PLUS'"),
    }
}

#[test]
fn arithmetic_takes_spliced_nonterminals() {
    let grammar = Grammar::define(grammars::arithmetic).unwrap();
    let tables = Config::new().generate(&grammar);

    let mut parser = Parser::new(&tables, symbols(&grammar, "T PLUS ID"));
    assert_eq!(parser.step(), Step::Goto);
    assert!(parser.run().is_ok());

    let mut parser = Parser::new(&tables, symbols(&grammar, "E"));
    assert!(parser.run().is_ok());
}

#[test]
fn precedence_removes_every_conflict() {
    init_tracing();
    let grammar = Grammar::define(grammars::arithmetic_prec).unwrap();
    let mut resolver = DefaultResolver::new();
    let tables = Config::new().generate_with_resolver(&grammar, &mut resolver);
    assert!(resolver.conflicts().is_empty());
    assert_eq!(tables.num_unused(), 0);

    for input in [
        "NUM",
        "NUM PLUS NUM STAR NUM",
        "MINUS NUM CARET NUM MINUS NUM",
        "LPAREN NUM SLASH NUM RPAREN STAR MINUS MINUS NUM",
    ] {
        let mut parser = Parser::new(&tables, symbols(&grammar, input));
        assert!(parser.run().is_ok(), "{}", input);
    }
    for input in ["", "NUM NUM", "LPAREN NUM", "NUM PLUS STAR NUM"] {
        let mut parser = Parser::new(&tables, symbols(&grammar, input));
        assert!(parser.run().is_err(), "{}", input);
    }
}

#[test]
fn g_simple1_is_not_slr() {
    init_tracing();
    let grammar = Grammar::define(grammars::g_simple1).unwrap();
    let mut resolver = DefaultResolver::new();
    let _tables = Config::new().generate_with_resolver(&grammar, &mut resolver);
    assert!(resolver
        .conflicts()
        .iter()
        .any(|conflict| conflict.kind == ConflictKind::ReduceReduce));
}

#[test]
fn g_simple2_is_slr_but_not_lr0() {
    let grammar = Grammar::define(grammars::g_simple2).unwrap();

    let mut resolver = DefaultResolver::new();
    Config::new().generate_with_resolver(&grammar, &mut resolver);
    assert!(resolver.conflicts().is_empty());

    let mut resolver = DefaultResolver::new();
    Config::new()
        .use_lr0()
        .generate_with_resolver(&grammar, &mut resolver);
    assert!(!resolver.conflicts().is_empty());
}

#[test]
fn optional_tail_follow_sets() {
    let grammar = Grammar::define(grammars::optional_tail).unwrap();
    let a = grammar.lookup("A").unwrap();
    assert!(grammar.nullable(a));
    assert!(grammar.follow(a).contains(grammar.end_of_input()));
    assert_eq!(
        grammar.follow(grammar.start()).iter().collect::<Vec<_>>(),
        [grammar.end_of_input()]
    );

    let tables = Config::new().generate(&grammar);
    let eoi = grammar.end_of_input();
    assert!(Parser::new(&tables, symbols(&grammar, "a a $end"))
        .run()
        .is_ok());
    assert!(Parser::new(&tables, vec![eoi]).run().is_ok());
}

#[test]
fn unreachable_production_is_reported_once() {
    init_tracing();
    let grammar = Grammar::define(grammars::unreachable).unwrap();
    let tables = Config::new().generate(&grammar);
    assert_eq!(tables.num_unused(), 1);
    let unused: Vec<_> = tables
        .unused_productions()
        .map(|p| p.display(&grammar).to_string())
        .collect();
    assert_eq!(unused, ["U := b"]);
}

#[test]
fn invalid_grammars() {
    let err = Grammar::define(|g| {
        let a = g.terminal("a", None)?;
        let s = g.nonterminal("S")?;
        let _ = g.nonterminal("X")?;
        g.rule(s, [slrgen::grammar::Elem::T(a)], None)
    })
    .unwrap_err();
    assert!(matches!(err, GrammarError::MissingProductions { ref name } if name == "X"));

    let err = Grammar::define(|g| {
        g.terminal("a", None)?;
        g.terminal("a", None)?;
        Ok(())
    })
    .unwrap_err();
    assert!(matches!(err, GrammarError::DuplicateSymbol { .. }));
}
