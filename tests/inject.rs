use parking_lot::Mutex;
use skuf::{
    args, signature, wrap, Arguments, Exit, InjectErrorKind, Injector, InstantiateErrorKind, Key, Options, Registry, Resource,
    ResolveErrorKind, TypeInfo,
};
use std::{
    cell::Cell,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

type Journal = Arc<Mutex<Vec<String>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Connection(u32);

#[derive(Debug, PartialEq, Eq)]
struct ValueError(&'static str);

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueError({})", self.0)
    }
}

// Not `Sync`
#[derive(Debug)]
struct LocalError(Cell<u8>);

impl fmt::Display for LocalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalError({})", self.0.get())
    }
}

#[derive(Clone, Copy, Default)]
struct Failures {
    acquire: bool,
    release: bool,
}

struct Pool {
    journal: Journal,
    failures: Failures,
}

impl Resource for Pool {
    type Target = Connection;

    fn acquire(&mut self) -> Result<Connection, InstantiateErrorKind> {
        if self.failures.acquire {
            return Err(anyhow::anyhow!("pool exhausted").into());
        }
        self.journal.lock().push("acquire".to_owned());
        Ok(Connection(1))
    }

    fn release(self, exit: Exit<'_>) -> Result<(), InstantiateErrorKind> {
        self.journal.lock().push(format!("release {exit:?}"));
        if self.failures.release {
            return Err(anyhow::anyhow!("connection lost").into());
        }
        Ok(())
    }
}

fn pool_registry(failures: Failures) -> (Arc<Registry>, Journal) {
    let registry = Arc::new(Registry::new());
    let journal = Journal::default();
    registry.provide(Options::resource({
        let journal = journal.clone();
        move || {
            Ok(Pool {
                journal: journal.clone(),
                failures,
            })
        }
    }));
    (registry, journal)
}

fn take_conn(journal: Journal) -> impl FnMut(Arguments) -> Result<Connection, ValueError> + Clone + Send + Sync + 'static {
    move |mut args: Arguments| {
        journal.lock().push("call".to_owned());
        args.take::<Connection>("conn").ok_or(ValueError("missing"))
    }
}

#[test]
fn test_resolve_not_registered() {
    let registry = Registry::new();

    assert!(matches!(
        registry.resolve(&Key::of::<Connection>()),
        Err(ResolveErrorKind::NoProducer { .. })
    ));
}

#[test]
fn test_instance_identity() {
    let registry = Registry::new();
    let conn = Arc::new(Connection(1));
    registry.provide(Options::instance(conn.clone()));

    let key = Key::of::<Arc<Connection>>();
    let first = registry.get::<Arc<Connection>>(&key).unwrap();
    let second = registry.get::<Arc<Connection>>(&key).unwrap();

    assert!(Arc::ptr_eq(&first, &conn));
    assert!(Arc::ptr_eq(&second, &conn));
}

#[test]
fn test_factory_instances_distinct() {
    let registry = Registry::new();
    let counter = Arc::new(AtomicU32::new(0));
    registry.provide(Options::factory({
        let counter = counter.clone();
        move || Ok(Arc::new(Connection(counter.fetch_add(1, Ordering::SeqCst))))
    }));

    let key = Key::of::<Arc<Connection>>();
    let first = registry.get::<Arc<Connection>>(&key).unwrap();
    let second = registry.get::<Arc<Connection>>(&key).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_ne!(first, second);
}

#[test]
fn test_priority() {
    let registry = Registry::new();
    registry.provide(Options::factory(|| Ok(Connection(2))).with_instance(Connection(1)));
    assert_eq!(registry.get::<Connection>(&Key::of::<Connection>()).unwrap(), Connection(1));

    let registry = Registry::new();
    let journal = Journal::default();
    registry.provide(
        Options::resource({
            let journal = journal.clone();
            move || {
                Ok(Pool {
                    journal: journal.clone(),
                    failures: Failures::default(),
                })
            }
        })
        .with_factory(|| Ok(Connection(3))),
    );
    assert_eq!(registry.get::<Connection>(&Key::of::<Connection>()).unwrap(), Connection(3));
    assert!(journal.lock().is_empty());
}

#[test]
fn test_resource_lifecycle() {
    let (registry, journal) = pool_registry(Failures::default());

    let mut injected = wrap(registry, signature![conn], take_conn(journal.clone()), "conn", Key::of::<Connection>()).unwrap();

    assert_eq!(injected.call(Arguments::new()).unwrap(), Connection(1));
    assert_eq!(*journal.lock(), ["acquire", "call", "release Completed"]);
}

#[test]
fn test_resource_released_on_error() {
    let (registry, journal) = pool_registry(Failures::default());

    let mut injected = wrap(
        registry,
        signature![conn],
        {
            let journal = journal.clone();
            move |_args: Arguments| {
                journal.lock().push("call".to_owned());
                Err::<(), _>(ValueError("boom"))
            }
        },
        "conn",
        Key::of::<Connection>(),
    )
    .unwrap();

    let err = injected.call(Arguments::new()).unwrap_err();

    assert_eq!(err.into_target(), Some(ValueError("boom")));
    assert_eq!(*journal.lock(), ["acquire", "call", "release Failed(ValueError(boom))"]);
}

#[test]
fn test_acquire_error() {
    let (registry, journal) = pool_registry(Failures {
        acquire: true,
        release: false,
    });

    let mut injected = wrap(registry, signature![conn], take_conn(journal.clone()), "conn", Key::of::<Connection>()).unwrap();

    let err = injected.call(Arguments::new()).unwrap_err();

    assert!(matches!(err, InjectErrorKind::Resolve(ResolveErrorKind::Instantiate(_))));
    assert_eq!(err.to_string(), "pool exhausted");
    assert!(journal.lock().is_empty());
}

#[test]
fn test_release_error() {
    let failures = Failures {
        acquire: false,
        release: true,
    };

    let (registry, journal) = pool_registry(failures);
    let mut injected = wrap(registry, signature![conn], take_conn(journal.clone()), "conn", Key::of::<Connection>()).unwrap();
    assert!(matches!(injected.call(Arguments::new()), Err(InjectErrorKind::Release(_))));

    let (registry, _) = pool_registry(failures);
    let mut injected = wrap(
        registry,
        signature![conn],
        |_args: Arguments| Err::<(), _>(ValueError("boom")),
        "conn",
        Key::of::<Connection>(),
    )
    .unwrap();
    assert!(matches!(
        injected.call(Arguments::new()),
        Err(InjectErrorKind::Target(ValueError("boom")))
    ));
}

#[test]
fn test_resource_released_on_panic() {
    let (registry, journal) = pool_registry(Failures::default());

    let mut injected = wrap(
        registry,
        signature![conn],
        |_args: Arguments| -> Result<(), ValueError> { panic!("target panicked") },
        "conn",
        Key::of::<Connection>(),
    )
    .unwrap();

    let result = panic::catch_unwind(AssertUnwindSafe(|| injected.call(Arguments::new())));

    assert!(result.is_err());
    assert_eq!(*journal.lock(), ["acquire", "release Aborted"]);
}

#[test]
fn test_clear() {
    let (registry, journal) = pool_registry(Failures::default());
    let mut injected = wrap(registry.clone(), signature![conn], take_conn(journal.clone()), "conn", Key::of::<Connection>()).unwrap();

    registry.clear();

    assert!(matches!(
        registry.resolve(&Key::of::<Connection>()),
        Err(ResolveErrorKind::NoProducer { .. })
    ));
    assert!(matches!(
        injected.call(Arguments::new()),
        Err(InjectErrorKind::Resolve(ResolveErrorKind::NoProducer { .. }))
    ));
    assert!(journal.lock().is_empty());
}

#[test]
fn test_positional_not_overwritten() {
    let registry = Arc::new(Registry::new());
    registry.provide(Options::instance(Connection(1)));

    let mut injected = wrap(
        registry,
        signature![user_id, conn],
        |mut args: Arguments| args.take::<Connection>("conn").ok_or(ValueError("missing")),
        "conn",
        Key::of::<Connection>(),
    )
    .unwrap();

    assert_eq!(injected.call(args![7u32, Connection(2)]).unwrap(), Connection(2));
    assert_eq!(injected.call(args![7u32]).unwrap(), Connection(1));
    assert_eq!(injected.call(args![; conn = Connection(3)]).unwrap(), Connection(3));
}

#[test]
fn test_composition_order() {
    let registry = Arc::new(Registry::new());
    registry.provide(Options::instance(Connection(1)));
    registry.register(Key::named("user_id"), Options::instance(7u32));

    let target = |mut args: Arguments| {
        let user_id = args.take::<u32>("user_id").ok_or(ValueError("user_id"))?;
        let conn = args.take::<Connection>("conn").ok_or(ValueError("conn"))?;
        Ok::<_, ValueError>((user_id, conn))
    };

    let mut conn_first = wrap(registry.clone(), signature![user_id, conn], target, "conn", Key::of::<Connection>())
        .unwrap()
        .bind("user_id", Key::named("user_id"))
        .unwrap();
    let mut user_first = wrap(registry.clone(), signature![user_id, conn], target, "user_id", Key::named("user_id"))
        .unwrap()
        .bind("conn", Key::of::<Connection>())
        .unwrap();

    for injected in [&mut conn_first, &mut user_first] {
        assert_eq!(injected.call(Arguments::new()).unwrap(), (7, Connection(1)));
        assert_eq!(injected.call(args![8u32]).unwrap(), (8, Connection(1)));
    }
}

#[test]
fn test_named_key_type_mismatch() {
    let registry = Arc::new(Registry::new());
    registry.register(Key::named("conn"), Options::instance("not a connection"));

    let mut injected = Injector::new(registry, signature![conn])
        .bind_as::<Connection>("conn", Key::named("conn"))
        .build(|mut args: Arguments| args.take::<Connection>("conn").ok_or(ValueError("missing")))
        .unwrap();

    assert!(matches!(
        injected.call(Arguments::new()),
        Err(InjectErrorKind::Resolve(ResolveErrorKind::IncorrectType { .. }))
    ));
}

#[test]
fn test_type_key_mismatch() {
    let registry = Arc::new(Registry::new());
    registry.register(Key::of::<Connection>(), Options::factory(|| Ok(5u8)));

    let mut injected = wrap(
        registry,
        signature![conn],
        |mut args: Arguments| args.take::<Connection>("conn").ok_or(ValueError("missing")),
        "conn",
        Key::of::<Connection>(),
    )
    .unwrap();

    let err = injected.call(Arguments::new()).unwrap_err();

    assert!(matches!(
        err,
        InjectErrorKind::Resolve(ResolveErrorKind::IncorrectType { expected, actual, .. })
            if expected == TypeInfo::of::<Connection>() && actual == TypeInfo::of::<u8>()
    ));
    assert!(err.to_string().contains("Actual: u8"));
}

#[test]
fn test_error_without_sync() {
    let (registry, journal) = pool_registry(Failures::default());

    let mut injected = wrap(
        registry,
        signature![conn],
        |_args: Arguments| Err::<(), _>(LocalError(Cell::new(3))),
        "conn",
        Key::of::<Connection>(),
    )
    .unwrap();

    let err = injected.call(Arguments::new()).unwrap_err();

    assert_eq!(err.into_target().map(|err| err.0.get()), Some(3));
    assert_eq!(*journal.lock(), ["acquire", "release Failed(LocalError(3))"]);
}

#[test]
fn test_clones_are_independent() {
    let (registry, journal) = pool_registry(Failures::default());
    let mut injected = wrap(registry, signature![conn], take_conn(journal.clone()), "conn", Key::of::<Connection>()).unwrap();
    let mut cloned = injected.clone();

    injected.call(Arguments::new()).unwrap();
    cloned.call(Arguments::new()).unwrap();

    assert_eq!(journal.lock().iter().filter(|entry| *entry == "release Completed").count(), 2);
}
