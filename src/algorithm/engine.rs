//! The vectorized dispatch engine.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use arrow_array::{BooleanArray, Float64Array, StringArray};
use arrow_buffer::{NullBufferBuilder, ScalarBuffer};

use crate::algorithm::broadcast::BroadcastPlan;
use crate::algorithm::catalog::{Arity, Operation, OperationSignature, Predicate};
use crate::algorithm::kernel::{self, ElementValue};
use crate::algorithm::output::{BatchErrors, BatchOutput, BatchValues, Exploded};
use crate::algorithm::prepared::{PreparedCache, PreparedEntry};
use crate::array::{GeometryArray, ShapedArray};
use crate::config::{CallOptions, EngineConfig, PreparedMode};
use crate::datatypes::OutputKind;
use crate::error::{GeoShapeError, Result};
use crate::handle::{GeometryHandle, HandleId};

type ElementResult = Result<Option<ElementValue>>;

/// Which operand of a binary predicate is evaluated through the prepared cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreparedSide {
    Left,
    Right,
}

/// Executes catalog operations elementwise over [`GeometryArray`]s.
///
/// Shapes are broadcast against each other, null slots propagate to null outputs without
/// a native call, and elements that fail either become null (recorded in
/// [`BatchOutput::errors`]) or abort the call in strict mode.
#[derive(Debug)]
pub struct DispatchEngine {
    config: EngineConfig,
    prepared: PreparedCache,
    #[cfg(feature = "rayon")]
    pool: Option<rayon::ThreadPool>,
}

static GLOBAL: OnceLock<DispatchEngine> = OnceLock::new();

impl DispatchEngine {
    /// Create an engine. Builds a dedicated thread pool if `max_threads` is set.
    pub fn new(config: EngineConfig) -> Result<Self> {
        #[cfg(feature = "rayon")]
        {
            let mut engine = Self::without_pool(config);
            if let Some(num_threads) = engine.config.max_threads {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()?;
                engine.pool = Some(pool);
            }
            Ok(engine)
        }

        #[cfg(not(feature = "rayon"))]
        {
            Ok(Self::without_pool(config))
        }
    }

    fn without_pool(config: EngineConfig) -> Self {
        Self {
            prepared: PreparedCache::new(config.prepared_cache_capacity),
            config,
            #[cfg(feature = "rayon")]
            pool: None,
        }
    }

    /// The process-wide engine used by the scalar facade.
    pub fn global() -> &'static DispatchEngine {
        GLOBAL.get_or_init(|| Self::without_pool(EngineConfig::default()))
    }

    /// Configure the process-wide engine. Fails if it is already in use.
    pub fn init_global(config: EngineConfig) -> Result<()> {
        let engine = Self::new(config)?;
        GLOBAL
            .set(engine)
            .map_err(|_| GeoShapeError::General("global engine is already initialized".to_string()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn prepared_cache(&self) -> &PreparedCache {
        &self.prepared
    }

    /// Default options for a call.
    pub fn call_options(&self) -> CallOptions {
        self.config.call_options()
    }

    /// Run any catalog operation on one or two operand arrays.
    pub fn execute(
        &self,
        op: &Operation,
        args: &[&GeometryArray],
        options: &CallOptions,
    ) -> Result<BatchOutput> {
        match (op.signature().arity, args) {
            (Arity::Unary, [input]) => self.unary(op, input, options),
            (Arity::Binary, [lhs, rhs]) => self.binary(op, lhs, rhs, options),
            (arity, args) => Err(GeoShapeError::IncorrectType(
                format!("{op} is {arity:?} but got {} operands", args.len()).into(),
            )),
        }
    }

    /// Run an operation looked up by name. Parameterized operations cannot be called by
    /// name.
    pub fn call(
        &self,
        name: &str,
        args: &[&GeometryArray],
        options: &CallOptions,
    ) -> Result<BatchOutput> {
        self.execute(&Operation::from_name(name)?, args, options)
    }

    /// Apply a unary operation to every slot.
    pub fn unary(
        &self,
        op: &Operation,
        input: &GeometryArray,
        options: &CallOptions,
    ) -> Result<BatchOutput> {
        let sig = op.signature();
        if sig.arity != Arity::Unary {
            return Err(GeoShapeError::IncorrectType(
                format!("{op} takes two operands").into(),
            ));
        }
        let plan = BroadcastPlan::unary(input.shape());
        let slots = input.slots();
        tracing::debug!(operation = %op, shape = ?plan.shape(), "dispatching unary batch");

        let (values, errors) = self.run(&plan, options, |index| {
            let Some(handle) = &slots[index] else {
                return Ok(None);
            };
            kernel::check_input(sig, handle)?;
            kernel::unary(op, handle).map(Some)
        })?;
        Ok(BatchOutput {
            values: assemble(op, &plan, values)?,
            errors,
        })
    }

    /// Apply a binary operation to every pair of slots after broadcasting.
    ///
    /// Incompatible shapes fail with [`GeoShapeError::Broadcast`] before any element is
    /// evaluated.
    pub fn binary(
        &self,
        op: &Operation,
        lhs: &GeometryArray,
        rhs: &GeometryArray,
        options: &CallOptions,
    ) -> Result<BatchOutput> {
        let sig = op.signature();
        if sig.arity != Arity::Binary {
            return Err(GeoShapeError::IncorrectType(
                format!("{op} takes one operand").into(),
            ));
        }
        if !sig.broadcastable && lhs.shape() != rhs.shape() {
            return Err(GeoShapeError::IncorrectType(
                format!("{op} requires operands of equal shape").into(),
            ));
        }
        let plan = BroadcastPlan::binary(lhs.shape(), rhs.shape())?;
        let side = match op {
            Operation::Predicate(predicate) => self.prepared_side(*predicate, &plan, options),
            _ => None,
        };
        tracing::debug!(
            operation = %op,
            lhs = ?lhs.shape(),
            rhs = ?rhs.shape(),
            shape = ?plan.shape(),
            prepared = ?side,
            "dispatching binary batch"
        );

        let prepared = match side {
            Some(PreparedSide::Left) => self.resolve_prepared(sig, lhs)?,
            Some(PreparedSide::Right) => self.resolve_prepared(sig, rhs)?,
            None => HashMap::new(),
        };

        let (lhs_slots, rhs_slots) = (lhs.slots(), rhs.slots());
        let (values, errors) = self.run(&plan, options, |index| {
            let a = &lhs_slots[plan.source_index(0, index)];
            let b = &rhs_slots[plan.source_index(1, index)];
            let (Some(a), Some(b)) = (a, b) else {
                return Ok(None);
            };
            kernel::check_input(sig, a)?;
            kernel::check_input(sig, b)?;
            binary_element(op, side, &prepared, a, b).map(Some)
        })?;
        Ok(BatchOutput {
            values: assemble(op, &plan, values)?,
            errors,
        })
    }

    /// Evaluate a spatial predicate, returning a boolean array.
    pub fn predicate(
        &self,
        predicate: Predicate,
        lhs: &GeometryArray,
        rhs: &GeometryArray,
        options: &CallOptions,
    ) -> Result<BatchOutput<ShapedArray<BooleanArray>>> {
        self.binary(&predicate.into(), lhs, rhs, options)?
            .map(BatchValues::into_boolean)
    }

    /// Apply a unary operation that produces numbers.
    pub fn measure(
        &self,
        op: &Operation,
        input: &GeometryArray,
        options: &CallOptions,
    ) -> Result<BatchOutput<ShapedArray<Float64Array>>> {
        self.unary(op, input, options)?.map(BatchValues::into_number)
    }

    /// Apply a unary operation that produces new geometries.
    pub fn construct(
        &self,
        op: &Operation,
        input: &GeometryArray,
        options: &CallOptions,
    ) -> Result<BatchOutput<GeometryArray>> {
        self.unary(op, input, options)?.map(BatchValues::into_geometry)
    }

    /// The constituents of every collection in `input`.
    pub fn constituents(
        &self,
        input: &GeometryArray,
        options: &CallOptions,
    ) -> Result<BatchOutput<Exploded>> {
        self.unary(&Operation::Constituents, input, options)?
            .map(BatchValues::into_parts)
    }

    fn prepared_side(
        &self,
        predicate: Predicate,
        plan: &BroadcastPlan,
        options: &CallOptions,
    ) -> Option<PreparedSide> {
        if !predicate.is_preparable() {
            return None;
        }
        match options.prepared {
            PreparedMode::Never => None,
            PreparedMode::Always => Some(PreparedSide::Left),
            PreparedMode::Auto => {
                let threshold = self.config.prepared_reuse_threshold.max(1);
                let (lhs_reuse, rhs_reuse) = (plan.reuse(0), plan.reuse(1));
                if lhs_reuse >= threshold && lhs_reuse >= rhs_reuse {
                    Some(PreparedSide::Left)
                } else if rhs_reuse >= threshold && predicate.converse().is_some() {
                    Some(PreparedSide::Right)
                } else {
                    None
                }
            }
        }
    }

    /// Look up or build the prepared geometry of every distinct usable handle in `operand`,
    /// once per batch.
    fn resolve_prepared(
        &self,
        sig: &OperationSignature,
        operand: &GeometryArray,
    ) -> Result<HashMap<HandleId, Arc<PreparedEntry>>> {
        let mut resolved = HashMap::new();
        for handle in operand.slots().iter().flatten() {
            if handle.is_empty()
                || resolved.contains_key(&handle.id())
                || kernel::check_input(sig, handle).is_err()
            {
                continue;
            }
            let entry = self.prepared.get_or_prepare(handle).map_err(|err| {
                tracing::warn!(error = %err, "failed to prepare operand");
                err
            })?;
            resolved.insert(handle.id(), entry);
        }
        Ok(resolved)
    }

    fn use_parallel(&self, len: usize, options: &CallOptions) -> bool {
        #[cfg(feature = "rayon")]
        {
            len > 1 && options.parallel.unwrap_or(len >= self.config.parallel_threshold)
        }

        #[cfg(not(feature = "rayon"))]
        {
            let _ = (len, options);
            false
        }
    }

    /// Evaluate every output position and split the results into values and errors.
    fn run<F>(
        &self,
        plan: &BroadcastPlan,
        options: &CallOptions,
        element: F,
    ) -> Result<(Vec<Option<ElementValue>>, BatchErrors)>
    where
        F: Fn(usize) -> ElementResult + Send + Sync,
    {
        let len = plan.len();
        let parallel = self.use_parallel(len, options);
        tracing::debug!(len, parallel, strict = options.strict, "evaluating batch");
        let results = if parallel {
            self.run_parallel(len, &element)
        } else {
            let mut results = Vec::with_capacity(len);
            for index in 0..len {
                let result = element(index);
                let stop = matches!(&result, Err(err) if options.strict || err.is_fatal());
                results.push(result);
                if stop {
                    break;
                }
            }
            results
        };

        let mut values = Vec::with_capacity(len);
        let mut errors = BatchErrors::default();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(value) => values.push(value),
                Err(err) if err.is_fatal() => {
                    tracing::warn!(index, error = %err, "batch aborted");
                    return Err(GeoShapeError::Element {
                        index,
                        source: Box::new(err),
                    });
                }
                Err(err) if options.strict => {
                    return Err(GeoShapeError::Element {
                        index,
                        source: Box::new(err),
                    });
                }
                Err(err) => {
                    tracing::trace!(index, error = %err, "element failed");
                    errors.push(index, plan.shape(), err);
                    values.push(None);
                }
            }
        }
        Ok((values, errors))
    }

    #[cfg(feature = "rayon")]
    fn run_parallel<F>(&self, len: usize, element: &F) -> Vec<ElementResult>
    where
        F: Fn(usize) -> ElementResult + Send + Sync,
    {
        use rayon::prelude::*;

        let mut output_vec = Vec::with_capacity(len);
        let run = |output: &mut Vec<ElementResult>| {
            (0..len).into_par_iter().map(element).collect_into_vec(output)
        };
        match &self.pool {
            Some(pool) => pool.install(|| run(&mut output_vec)),
            None => run(&mut output_vec),
        }
        output_vec
    }

    #[cfg(not(feature = "rayon"))]
    fn run_parallel<F>(&self, len: usize, element: &F) -> Vec<ElementResult>
    where
        F: Fn(usize) -> ElementResult + Send + Sync,
    {
        (0..len).map(element).collect()
    }
}

fn binary_element(
    op: &Operation,
    side: Option<PreparedSide>,
    prepared: &HashMap<HandleId, Arc<PreparedEntry>>,
    a: &GeometryHandle,
    b: &GeometryHandle,
) -> Result<ElementValue> {
    if let Operation::Predicate(predicate) = op {
        match side {
            Some(PreparedSide::Left) => {
                if let Some(entry) = prepared.get(&a.id()) {
                    return Ok(ElementValue::Bool(entry.evaluate(*predicate, b.as_geos())?));
                }
            }
            Some(PreparedSide::Right) => {
                if let (Some(entry), Some(converse)) = (prepared.get(&b.id()), predicate.converse()) {
                    return Ok(ElementValue::Bool(entry.evaluate(converse, a.as_geos())?));
                }
            }
            None => {}
        }
    }
    kernel::binary(op, a, b)
}

/// Build the output values of `op` from per-element results.
fn assemble(
    op: &Operation,
    plan: &BroadcastPlan,
    values: Vec<Option<ElementValue>>,
) -> Result<BatchValues> {
    let shape = plan.shape().to_vec();
    match op {
        Operation::Bounds => {
            let mut coords = Vec::with_capacity(values.len() * 4);
            let mut nulls = NullBufferBuilder::new(values.len() * 4);
            for value in values {
                match value {
                    Some(value) => {
                        coords.extend(value.into_bounds()?);
                        nulls.append_n_non_nulls(4);
                    }
                    None => {
                        coords.extend([0.0; 4]);
                        nulls.append_n_nulls(4);
                    }
                }
            }
            let mut shape = shape;
            shape.push(4);
            let array = Float64Array::new(ScalarBuffer::from(coords), nulls.finish());
            return Ok(BatchValues::Number(ShapedArray::new(shape, array)));
        }
        Operation::Constituents => {
            let mut parts = Vec::new();
            let mut source_index = Vec::new();
            for (index, value) in values.into_iter().enumerate() {
                if let Some(value) = value {
                    for part in value.into_parts()? {
                        parts.push(Some(part));
                        source_index.push(index);
                    }
                }
            }
            return Ok(BatchValues::Parts(Exploded {
                parts: GeometryArray::from(parts),
                source_index,
            }));
        }
        _ => {}
    }

    let values = match op.signature().output {
        OutputKind::Boolean => {
            let values = collect(values, ElementValue::into_bool)?;
            BatchValues::Boolean(ShapedArray::new(shape, BooleanArray::from(values)))
        }
        OutputKind::Number => {
            let values = collect(values, ElementValue::into_number)?;
            BatchValues::Number(ShapedArray::new(shape, Float64Array::from(values)))
        }
        OutputKind::Text => {
            let values = collect(values, ElementValue::into_text)?;
            BatchValues::Text(ShapedArray::new(shape, StringArray::from(values)))
        }
        OutputKind::Handle => {
            let values = collect(values, ElementValue::into_geometry)?;
            BatchValues::Geometry(GeometryArray::try_new(shape, values)?)
        }
    };
    Ok(values)
}

fn collect<T>(
    values: Vec<Option<ElementValue>>,
    f: impl Fn(ElementValue) -> Result<T>,
) -> Result<Vec<Option<T>>> {
    values
        .into_iter()
        .map(|value| value.map(&f).transpose())
        .collect()
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use approx::assert_relative_eq;
    use arrow_array::Array;

    use super::*;
    use crate::array::GeometryArray;
    use crate::datatypes::TypeTag;
    use crate::test::{point, points, square, wkt};

    fn engine() -> DispatchEngine {
        DispatchEngine::new(EngineConfig::default()).unwrap()
    }

    fn lenient() -> CallOptions {
        CallOptions::default()
    }

    #[test]
    fn box_contains_points() {
        let rect = GeometryArray::from(GeometryHandle::rectangle(2.0, 2.0, 7.0, 7.0).unwrap());
        let pts = GeometryArray::from(vec![point(1.0, 9.0), point(3.0, 5.0), point(7.0, 6.0)]);
        let out = engine()
            .predicate(Predicate::Contains, &rect, &pts, &lenient())
            .unwrap();
        assert!(out.errors.is_empty());
        assert_eq!(out.values.shape(), &[3]);
        assert_eq!(
            out.values.values(),
            &BooleanArray::from(vec![false, true, false])
        );
    }

    #[test]
    fn nulls_propagate() {
        let lhs = GeometryArray::from(vec![Some(square(0.0, 0.0, 4.0)), None, Some(square(0.0, 0.0, 4.0))]);
        let rhs = GeometryArray::from(vec![Some(point(1.0, 1.0)), Some(point(1.0, 1.0)), None]);
        let out = engine()
            .predicate(Predicate::Intersects, &lhs, &rhs, &lenient())
            .unwrap();
        assert!(out.errors.is_empty());
        assert_eq!(
            out.values.values(),
            &BooleanArray::from(vec![Some(true), None, None])
        );

        let area = engine()
            .measure(&Operation::Area, &rhs, &lenient())
            .unwrap();
        assert!(area.values.values().is_null(2));
    }

    #[test]
    fn broadcast_error_before_evaluation() {
        // an invalid first element would fail a strict call if anything were evaluated
        let mut slots = vec![Some(wkt("POLYGON ((0 0, 1 1, 1 0, 0 1, 0 0))"))];
        slots.extend((0..5).map(|i| Some(square(i as f64, 0.0, 1.0))));
        let lhs = GeometryArray::try_new(vec![2, 3], slots).unwrap();
        let rhs = GeometryArray::from(vec![point(0.0, 0.0); 4]);

        let engine = engine();
        let options = CallOptions::strict().with_prepared(PreparedMode::Always);
        let err = engine
            .binary(&Predicate::Contains.into(), &lhs, &rhs, &options)
            .unwrap_err();
        assert!(matches!(err, GeoShapeError::Broadcast { axis: 1, .. }));
        let err = engine
            .binary(&Operation::Union, &lhs, &rhs, &options)
            .unwrap_err();
        assert!(matches!(err, GeoShapeError::Broadcast { axis: 1, .. }));
        assert_eq!(engine.prepared_cache().stats(), Default::default());
    }

    #[test]
    fn resource_errors_abort_lenient_batches() {
        let engine = engine();
        let plan = BroadcastPlan::unary(&[4]);
        let evaluated = AtomicUsize::new(0);
        let err = engine
            .run(&plan, &lenient().with_parallel(false), |index| {
                evaluated.fetch_add(1, Ordering::Relaxed);
                match index {
                    0 => Err(GeoShapeError::IncorrectType("not fatal".into())),
                    2 => Err(GeoShapeError::Resource("out of memory".to_string())),
                    _ => Ok(None),
                }
            })
            .unwrap_err();
        match err {
            GeoShapeError::Element { index, source } => {
                assert_eq!(index, 2);
                assert!(matches!(*source, GeoShapeError::Resource(_)));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(evaluated.load(Ordering::Relaxed), 3);

        let parallel = engine.run(&plan, &lenient().with_parallel(true), |index| {
            if index == 3 {
                Err(GeoShapeError::Resource("out of memory".to_string()))
            } else {
                Ok(None)
            }
        });
        assert!(matches!(parallel, Err(GeoShapeError::Element { index: 3, .. })));
    }

    #[test]
    fn prepared_entries_resolved_once_per_batch() {
        let engine = engine();
        let polygon = GeometryArray::from(square(0.0, 0.0, 5.0));
        let grid: GeometryArray = (0..50).map(|i| Some(point(i as f64 / 10.0, 1.0))).collect();
        let options = lenient().with_prepared(PreparedMode::Always);

        engine
            .predicate(Predicate::Intersects, &polygon, &grid, &options)
            .unwrap();
        let stats = engine.prepared_cache().stats();
        assert_eq!((stats.hits, stats.misses), (0, 1));

        engine
            .predicate(Predicate::Intersects, &polygon, &grid, &options)
            .unwrap();
        let stats = engine.prepared_cache().stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[test]
    fn two_dimensional_broadcast() {
        let column = GeometryArray::try_new(
            vec![2, 1],
            vec![Some(square(0.0, 0.0, 2.0)), Some(square(10.0, 10.0, 2.0))],
        )
        .unwrap();
        let row = points(&[(1.0, 1.0), (11.0, 11.0), (5.0, 5.0)]);
        let out = engine()
            .predicate(Predicate::Contains, &column, &row, &lenient())
            .unwrap();
        assert_eq!(out.values.shape(), &[2, 3]);
        assert_eq!(
            out.values.values(),
            &BooleanArray::from(vec![true, false, false, false, true, false])
        );
    }

    #[test]
    fn lenient_partial_failure() {
        let input = GeometryArray::from(vec![
            square(0.0, 0.0, 1.0),
            wkt("POLYGON ((0 0, 1 1, 1 0, 0 1, 0 0))"),
            square(0.0, 0.0, 1.0),
        ]);
        let other = GeometryArray::from(square(0.5, 0.5, 1.0));
        let out = engine()
            .binary(&Operation::Intersection, &input, &other, &lenient())
            .unwrap();
        assert_eq!(out.errors.indices(), vec![1]);
        let failure = out.errors.iter().next().unwrap();
        assert_eq!(failure.multi_index, vec![1]);
        assert!(matches!(failure.error, GeoShapeError::InvalidGeometry { .. }));

        let values = out.values.into_geometry().unwrap();
        assert!(values.get(0).unwrap().is_some());
        assert!(values.get(1).unwrap().is_none());
        assert!(values.get(2).unwrap().is_some());
    }

    #[test]
    fn strict_mode_fails_on_first_error() {
        let input = GeometryArray::from(vec![
            square(0.0, 0.0, 1.0),
            wkt("POLYGON ((0 0, 1 1, 1 0, 0 1, 0 0))"),
        ]);
        let other = GeometryArray::from(square(0.5, 0.5, 1.0));
        let err = engine()
            .binary(&Operation::Union, &input, &other, &CallOptions::strict())
            .unwrap_err();
        match err {
            GeoShapeError::Element { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(*source, GeoShapeError::InvalidGeometry { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn measurements_and_bounds() {
        let input = GeometryArray::from(vec![
            Some(square(0.0, 0.0, 2.0)),
            None,
            Some(wkt("LINESTRING (0 0, 3 4)")),
        ]);
        let area = engine().measure(&Operation::Area, &input, &lenient()).unwrap();
        assert_relative_eq!(area.values.values().value(0), 4.0);

        let length = engine()
            .measure(&Operation::Length, &input, &lenient())
            .unwrap();
        assert_relative_eq!(length.values.values().value(2), 5.0);

        let bounds = engine()
            .measure(&Operation::Bounds, &input, &lenient())
            .unwrap();
        assert_eq!(bounds.values.shape(), &[3, 4]);
        let nd = bounds.values.to_ndarray().unwrap();
        assert_eq!(nd[&[2usize, 2][..]], Some(3.0));
        assert_eq!(nd[&[1usize, 0][..]], None);
    }

    #[test]
    fn constructors_return_new_handles() {
        let input = GeometryArray::from(vec![point(0.0, 0.0), point(5.0, 5.0)]);
        let out = engine()
            .construct(&Operation::buffer(1.0), &input, &lenient())
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(out.type_tags(), vec![Some(TypeTag::Polygon); 2]);

        let hulls = engine()
            .construct(&Operation::ConvexHull, &GeometryArray::from(wkt("MULTIPOINT ((0 0), (1 0), (0 1))")), &lenient())
            .unwrap();
        assert_eq!(hulls.values.shape(), &[] as &[usize]);
        assert_eq!(hulls.values.type_tags(), vec![Some(TypeTag::Polygon)]);
    }

    #[test]
    fn dispatch_by_name() {
        let input = GeometryArray::from(vec![point(0.0, 0.0)]);
        let out = engine().call("is_valid", &[&input], &lenient()).unwrap();
        assert_eq!(
            out.values.into_boolean().unwrap().values(),
            &BooleanArray::from(vec![true])
        );
        assert!(engine().call("buffer", &[&input], &lenient()).is_err());
        assert!(engine().call("area", &[&input, &input], &lenient()).is_err());
    }

    #[test]
    fn constituents_flatten_collections() {
        let input = GeometryArray::from(vec![
            Some(wkt("MULTIPOINT ((0 0), (1 1))")),
            None,
            Some(point(3.0, 3.0)),
            Some(wkt("MULTIPOINT EMPTY")),
        ]);
        let out = engine().constituents(&input, &lenient()).unwrap();
        assert_eq!(out.values.source_index, vec![0, 0]);
        assert_eq!(out.values.parts_of(0).count(), 2);
        assert_eq!(out.errors.indices(), vec![2]);
        assert!(matches!(
            out.errors.iter().next().unwrap().error,
            GeoShapeError::NotIterable(TypeTag::Point)
        ));
    }

    #[test]
    fn text_output() {
        let input = GeometryArray::from(vec![Some(point(1.0, 2.0)), None]);
        let out = engine().call("to_wkt", &[&input], &lenient()).unwrap();
        let text = out.values.into_text().unwrap();
        assert!(text.values().value(0).starts_with("POINT"));
        assert!(text.values().is_null(1));
    }

    #[test]
    fn prepared_path_matches_direct_path() {
        let polygons = GeometryArray::try_new(
            vec![2, 1],
            vec![Some(square(0.0, 0.0, 5.0)), Some(wkt("POLYGON EMPTY"))],
        )
        .unwrap();
        let grid: Vec<_> = (0..8)
            .flat_map(|x| (0..8).map(move |y| point(x as f64, y as f64)))
            .collect();
        let pts = GeometryArray::from(grid);

        let engine = engine();
        for predicate in [
            Predicate::Contains,
            Predicate::Intersects,
            Predicate::Touches,
            Predicate::Disjoint,
            Predicate::Within,
            Predicate::Crosses,
            Predicate::Overlaps,
        ] {
            let direct = engine
                .predicate(predicate, &polygons, &pts, &lenient().with_prepared(PreparedMode::Never))
                .unwrap();
            let prepared = engine
                .predicate(predicate, &polygons, &pts, &lenient().with_prepared(PreparedMode::Always))
                .unwrap();
            assert_eq!(direct.values, prepared.values, "{predicate:?}");

            // right operand through the converse
            let swapped_direct = engine
                .predicate(predicate, &pts, &polygons, &lenient().with_prepared(PreparedMode::Never))
                .unwrap();
            let swapped_auto = engine
                .predicate(predicate, &pts, &polygons, &lenient())
                .unwrap();
            assert_eq!(swapped_direct.values, swapped_auto.values, "{predicate:?}");
        }
        assert!(engine.prepared_cache().stats().hits > 0);
    }

    #[test]
    fn auto_mode_prepares_reused_operands() {
        let engine = DispatchEngine::new(EngineConfig::default().with_prepared_reuse_threshold(3)).unwrap();
        let polygon = GeometryArray::from(square(0.0, 0.0, 5.0));
        let few = points(&[(1.0, 1.0), (9.0, 9.0)]);
        engine
            .predicate(Predicate::Contains, &polygon, &few, &lenient())
            .unwrap();
        assert_eq!(engine.prepared_cache().stats().misses, 0);

        let many = points(&[(1.0, 1.0), (9.0, 9.0), (2.0, 2.0)]);
        engine
            .predicate(Predicate::Contains, &polygon, &many, &lenient())
            .unwrap();
        assert_eq!(engine.prepared_cache().stats().misses, 1);

        // equals is never prepared
        engine
            .predicate(Predicate::Equals, &polygon, &many, &lenient().with_prepared(PreparedMode::Always))
            .unwrap();
        assert_eq!(engine.prepared_cache().stats().misses, 1);
    }

    #[test]
    fn parallel_matches_sequential() {
        let engine = DispatchEngine::new(
            EngineConfig::default()
                .with_parallel_threshold(16)
                .with_max_threads(2),
        )
        .unwrap();
        let pts: GeometryArray = (0..100)
            .map(|i| (i % 7 != 0).then(|| point(i as f64 / 10.0, 1.0)))
            .collect();
        let polygon = GeometryArray::from(square(0.0, 0.0, 5.0));
        let sequential = engine
            .predicate(Predicate::Within, &pts, &polygon, &lenient().with_parallel(false))
            .unwrap();
        let parallel = engine
            .predicate(Predicate::Within, &pts, &polygon, &lenient())
            .unwrap();
        assert_eq!(sequential.values, parallel.values);
        assert_eq!(parallel.values.null_count(), 15);
    }
}
