//! Subtree walking: repeated GETNEXT until the result falls outside the
//! requested subtree. Grounded on the `snmpwalk` helper shared by
//! `nssct.plugins.cisco` and friends.

use crate::error::Error;
use crate::oid::Oid;
use crate::varbind::VarBind;
use crate::Engine;

/// Walk every OID bound under `root`, in OID order, stopping at the first
/// successor outside the subtree or at end-of-MIB.
pub async fn walk_subtree<E: Engine + ?Sized>(
    engine: &E,
    root: Oid,
) -> Result<Vec<VarBind>, Error> {
    let mut out = Vec::new();
    let mut current = root.clone();
    loop {
        match engine.get_next(current.clone()).await {
            Ok((oid, value)) => {
                if !oid.starts_with(&root) {
                    break;
                }
                current = oid.clone();
                out.push(VarBind::new(oid, value));
            }
            Err(Error::EndOfMib) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// Whether `oid` lies within the subtree rooted at `prefix`.
pub fn oid_starts_with(oid: &Oid, prefix: &Oid) -> bool {
    oid.starts_with(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::engine::SimpleEngine;
    use crate::oid;
    use crate::value::Value;

    #[test]
    fn walk_collects_every_binding_in_the_subtree() {
        let backend = MockBackend::from_text(
            ".1.1.1 = INTEGER: 1\n.1.1.2 = INTEGER: 2\n.1.2.1 = INTEGER: 3\n",
        )
        .unwrap();
        let engine = SimpleEngine::new(backend);

        let fut = walk_subtree(&engine, oid!(1, 1));
        let rows = futures_executor_block_on(fut);
        assert_eq!(rows.unwrap(), vec![
            VarBind::new(oid!(1, 1, 1), Value::Integer(1)),
            VarBind::new(oid!(1, 1, 2), Value::Integer(2)),
        ]);
    }

    // The crate deliberately carries no async executor dependency (the
    // controller polls manually); this helper drives the same
    // already-resolved-future-only pattern tests need without one.
    fn futures_executor_block_on<T>(fut: impl std::future::Future<Output = T>) -> T {
        use std::task::{Context, Waker};
        let mut fut = Box::pin(fut);
        let waker = Waker::noop();
        let mut cx = Context::from_waker(waker);
        loop {
            if let std::task::Poll::Ready(v) = fut.as_mut().poll(&mut cx) {
                return v;
            }
        }
    }
}
