//! DIMACS CNF output, for running the model through external solvers.

use std::io::Write;

use crate::lit::{Constraint, Var};
use crate::pool::{Origin, Pool};
use crate::Error;

/// Writes `constraint` as DIMACS CNF. Decision atoms get a `c` line naming
/// the cell and team (or pair) they stand for.
pub fn write_dimacs<W: Write>(w: &mut W, pool: &Pool, constraint: &Constraint) -> Result<(), Error> {
    let num_vars = pool.num_vars().max(constraint.num_vars());
    writeln!(w, "c run {}", pool.run())?;
    for idx in 0..pool.num_vars() {
        let var = Var::from_index(idx);
        if let Some(Origin::Atom(atom)) = pool.origin(var) {
            writeln!(w, "c {} {}", var.positive().to_dimacs(), atom)?;
        }
    }
    writeln!(w, "p cnf {} {}", num_vars, constraint.len())?;
    for clause in constraint.clauses() {
        for lit in clause {
            write!(w, "{} ", lit.to_dimacs())?;
        }
        writeln!(w, "0")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BuildOptions, Instance, RoundRobinModel, Slot};
    use crate::pool::{Atom, RunId};

    #[test]
    fn small_model_header_and_comments() {
        let mut pool = Pool::with_run(RunId(3));
        let model = RoundRobinModel::build(&mut pool, Instance::new(2).unwrap(), &BuildOptions::default()).unwrap();

        let mut out = Vec::new();
        write_dimacs(&mut out, &pool, model.constraint()).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("c run r3"));
        let header = text.lines().find(|l| l.starts_with("p cnf")).unwrap();
        assert_eq!(header, format!("p cnf {} {}", pool.num_vars(), model.constraint().len()));

        let clauses = text.lines().skip_while(|l| !l.starts_with("p cnf")).skip(1).collect::<Vec<_>>();
        assert_eq!(clauses.len(), model.constraint().len());
        assert!(clauses.iter().all(|l| l.ends_with(" 0") || *l == "0"));

        let home2 = pool.lookup(&Atom::Assign { period: 0, week: 0, slot: Slot::Home, team: 2 }).unwrap();
        assert!(text.contains(&format!("c {} p0 w0 home=2", home2.to_dimacs())));
    }

    #[test]
    fn empty_clause_is_written_as_bare_zero() {
        let pool = Pool::with_run(RunId(0));
        let mut out = Vec::new();
        write_dimacs(&mut out, &pool, &Constraint::contradiction()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "c run r0\np cnf 0 1\n0\n");
    }
}
