//! Grammar types.

use crate::{analysis::Analyses, scc, types::SymbolSet, util::display_fn};
use std::{borrow::Cow, fmt, marker::PhantomData};

/// The index of a symbol in a [`Grammar`].
///
/// Nonterminals occupy `[0, num_nts)` and terminals `[num_nts, num_syms)`.
/// The first nonterminal is the start symbol and the last terminal is the
/// end-of-input marker.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SymbolID {
    raw: u16,
}

impl SymbolID {
    /// The start symbol.
    pub const START: Self = Self::from_raw(0);

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.raw
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.raw as usize
    }

    // Symbol counts are checked against the `u16` range in `Grammar::new`.
    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index <= u16::MAX as usize);
        Self::from_raw(index as u16)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[non_exhaustive]
pub struct Precedence {
    pub priority: u16,
    pub assoc: Assoc,
}

impl Precedence {
    pub const fn new(priority: u16, assoc: Assoc) -> Self {
        Self { priority, assoc }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[non_exhaustive]
pub enum Assoc {
    Left,
    Right,
    Nonassoc,
}

impl fmt::Display for Assoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Nonassoc => write!(f, "nonassoc"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    name: Cow<'static, str>,
    precedence: Option<Precedence>,
}

impl Symbol {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            precedence: None,
        }
    }

    /// Attach a precedence, consulted when this terminal is shifted against
    /// a competing reduction.
    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = Some(precedence);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn precedence(&self) -> Option<Precedence> {
        self.precedence
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The right-hand side of a production, as handed to [`Grammar::new`].
#[derive(Debug, Clone, Default)]
pub struct Alternative {
    pub rhs: Vec<SymbolID>,
    pub precedence: Option<Precedence>,
}

impl Alternative {
    pub fn new<I>(rhs: I) -> Self
    where
        I: IntoIterator<Item = SymbolID>,
    {
        Self {
            rhs: rhs.into_iter().collect(),
            precedence: None,
        }
    }

    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = Some(precedence);
        self
    }
}

/// The type that represents a production rule in grammar.
#[derive(Debug)]
pub struct Production {
    lhs: SymbolID,
    index: usize,
    seq_no: usize,
    rhs: Vec<SymbolID>,
    precedence: Option<Precedence>,
}

impl Production {
    /// Return the left-hand side of this production.
    pub fn lhs(&self) -> SymbolID {
        self.lhs
    }

    /// Return the position of this production among those of its left-hand side.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Return the number identifying this production across the whole grammar.
    pub fn seq_no(&self) -> usize {
        self.seq_no
    }

    /// Return the right-hand side of this production.
    pub fn rhs(&self) -> &[SymbolID] {
        &self.rhs[..]
    }

    /// The explicit precedence if any, otherwise the one of the rightmost
    /// terminal.
    pub fn precedence(&self, g: &Grammar) -> Option<Precedence> {
        match self.precedence {
            Some(prec) => Some(prec),
            None => {
                for &symbol in self.rhs.iter().rev() {
                    if g.is_terminal(symbol) {
                        return g.symbol(symbol).precedence();
                    }
                }
                None
            }
        }
    }

    // `"LHS := R1 R2 R3"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            write!(f, "{} :=", g.symbol(self.lhs))?;
            if self.rhs.is_empty() {
                return write!(f, " ε");
            }
            for &symbol in &self.rhs {
                write!(f, " {}", g.symbol(symbol))?;
            }
            Ok(())
        })
    }
}

/// A validated context-free grammar, together with its dependency graph and
/// the results of the nullable/finitary/left/first/follow analyses.
#[derive(Debug)]
pub struct Grammar {
    symbols: Vec<Symbol>,
    num_nts: usize,
    productions: Vec<Vec<Production>>,
    num_productions: usize,
    depends: Vec<SymbolSet>,
    revdeps: Vec<SymbolSet>,
    components: Vec<Vec<SymbolID>>,
    analyses: Analyses,
}

impl Grammar {
    /// Validate the symbols and productions and derive everything the table
    /// construction needs from them.
    ///
    /// `symbols[..num_nts]` are the nonterminals, `productions[i]` lists the
    /// alternatives of nonterminal `i`.
    #[tracing::instrument(skip_all)]
    pub fn new(
        symbols: Vec<Symbol>,
        num_nts: usize,
        productions: Vec<Vec<Alternative>>,
    ) -> Result<Self, GrammarError> {
        let num_syms = symbols.len();
        if num_syms == 0 {
            return Err(GrammarError::NoSymbols);
        }
        if num_syms > u16::MAX as usize {
            return Err(GrammarError::TooManySymbols {
                count: num_syms,
                max: u16::MAX as usize,
            });
        }
        if num_nts == 0 {
            return Err(GrammarError::NoNonterminals);
        }
        if num_nts >= num_syms {
            return Err(GrammarError::NoTerminals);
        }
        if productions.len() > num_nts {
            return Err(GrammarError::ExtraProductions {
                expected: num_nts,
                found: productions.len(),
            });
        }

        let mut alternatives = productions;
        alternatives.resize_with(num_nts, Vec::new);

        let mut productions = Vec::with_capacity(num_nts);
        let mut seq_no = 0;
        for (i, alternatives) in alternatives.into_iter().enumerate() {
            let lhs = SymbolID::from_index(i);
            if alternatives.is_empty() {
                return Err(GrammarError::MissingProductions {
                    name: symbols[i].name().to_owned(),
                });
            }

            let mut prods = Vec::with_capacity(alternatives.len());
            for (index, alternative) in alternatives.into_iter().enumerate() {
                if let Some(symbol) = alternative.rhs.iter().find(|s| s.index() >= num_syms) {
                    return Err(GrammarError::SymbolOutOfRange {
                        lhs: symbols[i].name().to_owned(),
                        index,
                        symbol: symbol.index(),
                    });
                }
                prods.push(Production {
                    lhs,
                    index,
                    seq_no,
                    rhs: alternative.rhs,
                    precedence: alternative.precedence,
                });
                seq_no += 1;
            }
            productions.push(prods);
        }

        let mut depends = vec![SymbolSet::default(); num_nts];
        let mut revdeps = vec![SymbolSet::default(); num_nts];
        for (i, prods) in productions.iter().enumerate() {
            let lhs = SymbolID::from_index(i);
            for symbol in prods.iter().flat_map(|p| &p.rhs) {
                if symbol.index() < num_nts {
                    depends[i].insert(*symbol);
                    revdeps[symbol.index()].insert(lhs);
                }
            }
        }

        let components: Vec<Vec<SymbolID>> =
            scc::components(num_nts, |i| depends[i].iter().map(SymbolID::index))
                .into_iter()
                .map(|c| c.into_iter().map(SymbolID::from_index).collect())
                .collect();
        tracing::debug!(
            "{} symbols, {} productions, {} components",
            num_syms,
            seq_no,
            components.len()
        );

        let mut grammar = Self {
            symbols,
            num_nts,
            productions,
            num_productions: seq_no,
            depends,
            revdeps,
            components,
            analyses: Analyses::default(),
        };
        grammar.analyses = Analyses::compute(&grammar);

        for n in grammar.non_finitary() {
            tracing::warn!(
                "the nonterminal `{}' derives no finite terminal string",
                grammar.symbol(n)
            );
        }

        Ok(grammar)
    }

    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarError>
    where
        F: FnOnce(&mut GrammarDef<'_>) -> Result<(), GrammarError>,
    {
        let mut def = GrammarDef {
            terminals: vec![],
            nonterminals: vec![],
            rules: vec![],
            start: None,
            _marker: PhantomData,
        };
        f(&mut def)?;
        def.end()
    }

    pub fn num_syms(&self) -> usize {
        self.symbols.len()
    }

    pub fn num_nts(&self) -> usize {
        self.num_nts
    }

    pub fn num_ts(&self) -> usize {
        self.symbols.len() - self.num_nts
    }

    pub fn num_productions(&self) -> usize {
        self.num_productions
    }

    pub fn symbol(&self, id: SymbolID) -> &Symbol {
        &self.symbols[id.index()]
    }

    /// Find a symbol by its name.
    pub fn lookup(&self, name: &str) -> Option<SymbolID> {
        self.symbols
            .iter()
            .position(|s| s.name() == name)
            .map(SymbolID::from_index)
    }

    pub fn is_nonterminal(&self, id: SymbolID) -> bool {
        id.index() < self.num_nts
    }

    pub fn is_terminal(&self, id: SymbolID) -> bool {
        (self.num_nts..self.symbols.len()).contains(&id.index())
    }

    pub fn start(&self) -> SymbolID {
        SymbolID::START
    }

    pub fn end_of_input(&self) -> SymbolID {
        SymbolID::from_index(self.symbols.len() - 1)
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = SymbolID> {
        (0..self.num_nts).map(SymbolID::from_index)
    }

    pub fn terminals(&self) -> impl Iterator<Item = SymbolID> {
        (self.num_nts..self.symbols.len()).map(SymbolID::from_index)
    }

    /// The productions of the nonterminal `n`, in declaration order.
    ///
    /// # Panics
    /// Panics if `n` is not a nonterminal.
    pub fn productions(&self, n: SymbolID) -> &[Production] {
        &self.productions[n.index()]
    }

    /// Iterate over all productions, in sequence-number order.
    pub fn all_productions(&self) -> impl Iterator<Item = &Production> + '_ {
        self.productions.iter().flatten()
    }

    /// The nonterminals referenced from the productions of `n`.
    pub fn depends(&self, n: SymbolID) -> &SymbolSet {
        &self.depends[n.index()]
    }

    /// The nonterminals whose productions reference `n`.
    pub fn revdeps(&self, n: SymbolID) -> &SymbolSet {
        &self.revdeps[n.index()]
    }

    /// The strongly-connected components of the dependency graph,
    /// dependencies first.
    pub fn components(&self) -> &[Vec<SymbolID>] {
        &self.components
    }

    /// Whether `id` derives the empty string. Terminals never do.
    pub fn nullable(&self, id: SymbolID) -> bool {
        self.analyses.nullable.contains(id)
    }

    /// Whether `id` derives at least one finite terminal string. Terminals
    /// always do.
    pub fn finitary(&self, id: SymbolID) -> bool {
        self.is_terminal(id) || self.analyses.finitary.contains(id)
    }

    /// Nonterminals that derive no finite terminal string.
    pub fn non_finitary(&self) -> impl Iterator<Item = SymbolID> + '_ {
        self.nonterminals().filter(|&n| !self.finitary(n))
    }

    /// The nonterminals reachable from `n` through leftmost symbols, `n` included.
    pub fn left(&self, n: SymbolID) -> &SymbolSet {
        self.analyses.left.get(n)
    }

    /// The terminals that can start a string derived from `n`.
    pub fn first(&self, n: SymbolID) -> &SymbolSet {
        self.analyses.first.get(n)
    }

    /// The terminals that can immediately follow `n`.
    pub fn follow(&self, n: SymbolID) -> &SymbolSet {
        self.analyses.follow.get(n)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## terminals:")?;
        for t in self.terminals() {
            let terminal = self.symbol(t);
            write!(f, "{}", terminal)?;
            if let Some(prec) = terminal.precedence() {
                write!(f, " (priority={}, assoc={})", prec.priority, prec.assoc)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## nonterminals:")?;
        for n in self.nonterminals() {
            write!(f, "{}", self.symbol(n))?;
            if n == self.start() {
                write!(f, " (start)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## rules:")?;
        for production in self.all_productions() {
            write!(f, "{}", production.display(self))?;
            if let Some(prec) = &production.precedence {
                write!(f, " (priority={}, assoc={})", prec.priority, prec.assoc)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// A terminal symbol declared through [`GrammarDef`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct TerminalID {
    raw: u16,
}

impl TerminalID {
    /// Reserved symbol used as a terminal symbol that means the end of input.
    pub const EOI: Self = Self::new(0);

    const OFFSET: u16 = 1;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }
}

/// A nonterminal symbol declared through [`GrammarDef`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NonterminalID {
    raw: u16,
}

/// An element of a rule's right-hand side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Elem {
    T(TerminalID),
    N(NonterminalID),
}

#[derive(Debug)]
struct RuleDef {
    left: NonterminalID,
    right: Vec<Elem>,
    precedence: Option<Precedence>,
}

/// The contextural values for building a `Grammar`.
///
/// Ids handed out here are in declaration order; the final numbering puts
/// the start symbol first, the other nonterminals after it, then the
/// terminals and finally the end-of-input marker `$end`.
#[derive(Debug)]
pub struct GrammarDef<'def> {
    terminals: Vec<(String, Option<Precedence>)>,
    nonterminals: Vec<String>,
    rules: Vec<RuleDef>,
    start: Option<NonterminalID>,
    _marker: PhantomData<&'def mut ()>,
}

impl<'def> GrammarDef<'def> {
    /// The name of the end-of-input marker.
    pub const EOI_NAME: &'static str = "$end";

    /// Declare a terminal symbol used in this grammar.
    pub fn terminal(
        &mut self,
        name: &str,
        precedence: Option<Precedence>,
    ) -> Result<TerminalID, GrammarError> {
        self.verify_fresh(name)?;
        let id = TerminalID::new(self.terminals.len() as u16 + TerminalID::OFFSET);
        self.terminals.push((name.to_owned(), precedence));
        Ok(id)
    }

    /// Declare a nonterminal symbol used in this grammar.
    pub fn nonterminal(&mut self, name: &str) -> Result<NonterminalID, GrammarError> {
        self.verify_fresh(name)?;
        let id = NonterminalID {
            raw: self.nonterminals.len() as u16,
        };
        self.nonterminals.push(name.to_owned());
        Ok(id)
    }

    /// The end-of-input marker, for grammars that mention it explicitly.
    pub fn end_of_input(&self) -> TerminalID {
        TerminalID::EOI
    }

    /// Specify a production rule into this grammer.
    pub fn rule<I>(
        &mut self,
        left: NonterminalID,
        right: I,
        precedence: Option<Precedence>,
    ) -> Result<(), GrammarError>
    where
        I: IntoIterator<Item = Elem>,
    {
        self.verify_nonterminal(left)?;
        let right: Vec<_> = right.into_iter().collect();
        for elem in &right {
            match *elem {
                Elem::N(n) => self.verify_nonterminal(n)?,
                Elem::T(t) => self.verify_terminal(t)?,
            }
        }
        if self
            .rules
            .iter()
            .any(|rule| rule.left == left && rule.right == right)
        {
            return Err(GrammarError::DuplicateRule {
                lhs: self.nonterminals[usize::from(left.raw)].clone(),
            });
        }
        self.rules.push(RuleDef {
            left,
            right,
            precedence,
        });
        Ok(())
    }

    /// Specify the start symbol for this grammar.
    ///
    /// When not specified, the first declared nonterminal is used.
    pub fn start_symbol(&mut self, symbol: NonterminalID) -> Result<(), GrammarError> {
        self.verify_nonterminal(symbol)?;
        self.start.replace(symbol);
        Ok(())
    }

    // ids are plain numbers, so one from another definition still type-checks
    fn verify_nonterminal(&self, n: NonterminalID) -> Result<(), GrammarError> {
        if usize::from(n.raw) >= self.nonterminals.len() {
            return Err(GrammarError::UndeclaredNonterminal { raw: n.raw });
        }
        Ok(())
    }

    fn verify_terminal(&self, t: TerminalID) -> Result<(), GrammarError> {
        let declared = t == TerminalID::EOI
            || (t.raw >= TerminalID::OFFSET
                && usize::from(t.raw - TerminalID::OFFSET) < self.terminals.len());
        if !declared {
            return Err(GrammarError::UndeclaredTerminal { raw: t.raw });
        }
        Ok(())
    }

    fn verify_fresh(&self, name: &str) -> Result<(), GrammarError> {
        let taken = name == Self::EOI_NAME
            || self.terminals.iter().any(|(t, _)| t == name)
            || self.nonterminals.iter().any(|n| n == name);
        if taken {
            return Err(GrammarError::DuplicateSymbol {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    fn end(self) -> Result<Grammar, GrammarError> {
        let start = match self.start {
            Some(start) => start,
            None if !self.nonterminals.is_empty() => NonterminalID { raw: 0 },
            None => return Err(GrammarError::NoNonterminals),
        };

        // start symbol first, the rest in declaration order
        let num_nts = self.nonterminals.len();
        let mut nt_index = vec![0usize; num_nts];
        let mut symbols = Vec::with_capacity(num_nts + self.terminals.len() + 1);
        symbols.push(Symbol::new(self.nonterminals[usize::from(start.raw)].clone()));
        for (raw, name) in self.nonterminals.iter().enumerate() {
            if raw == usize::from(start.raw) {
                continue;
            }
            nt_index[raw] = symbols.len();
            symbols.push(Symbol::new(name.clone()));
        }
        for (name, precedence) in &self.terminals {
            let mut symbol = Symbol::new(name.clone());
            symbol.precedence = *precedence;
            symbols.push(symbol);
        }
        symbols.push(Symbol::new(Self::EOI_NAME));

        let eoi = symbols.len() - 1;
        let resolve = |elem: &Elem| match *elem {
            Elem::N(n) => SymbolID::from_index(nt_index[usize::from(n.raw)]),
            Elem::T(TerminalID::EOI) => SymbolID::from_index(eoi),
            Elem::T(t) => SymbolID::from_index(num_nts + usize::from(t.raw - TerminalID::OFFSET)),
        };

        let mut productions = vec![Vec::new(); num_nts];
        for rule in &self.rules {
            productions[nt_index[usize::from(rule.left.raw)]].push(Alternative {
                rhs: rule.right.iter().map(resolve).collect(),
                precedence: rule.precedence,
            });
        }

        Grammar::new(symbols, num_nts, productions)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("the grammar has no symbols")]
    NoSymbols,

    #[error("the grammar has no nonterminal symbols")]
    NoNonterminals,

    #[error("the grammar has no terminal symbols")]
    NoTerminals,

    #[error("too many symbols: {count} (at most {max} are supported)")]
    TooManySymbols { count: usize, max: usize },

    #[error("productions are given for {found} nonterminals, but only {expected} are declared")]
    ExtraProductions { expected: usize, found: usize },

    #[error("the nonterminal `{name}' has no production rules")]
    MissingProductions { name: String },

    #[error("production #{index} of `{lhs}' refers to the out-of-range symbol {symbol}")]
    SymbolOutOfRange {
        lhs: String,
        index: usize,
        symbol: usize,
    },

    #[error("the symbol `{name}' has already been declared")]
    DuplicateSymbol { name: String },

    #[error("duplicate production rule for `{lhs}'")]
    DuplicateRule { lhs: String },

    #[error("the nonterminal #{raw} was not declared in this grammar definition")]
    UndeclaredNonterminal { raw: u16 },

    #[error("the terminal #{raw} was not declared in this grammar definition")]
    UndeclaredTerminal { raw: u16 },
}
