use std::rc::Rc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use room_nav::logging::{LogEvent, LogSink};
use room_nav::{
    ActionMapper, BindingConfig, ChainAction, ElementHandler, ElementRef, EventHub, FocusRegistry,
    FocusSync, HandlerChain, LogLevel, Logger, LoggingResult, NODE_POSITION, NavigationAction,
    NavigationTree, NodeId, NodeTree, ROOT_ID, Rect, Resolution, ZoneElement, default_event_mapping,
};

#[derive(Clone, Default)]
struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
        Ok(())
    }
}

const ITEMS: u16 = 64;

struct Fixture {
    tree: Rc<NodeTree>,
    hub: Rc<EventHub>,
    items: Vec<NodeId>,
    _handlers: Vec<ElementHandler>,
    _mapper: ActionMapper,
    _sync: FocusSync,
}

fn list_chain(tree: &Rc<NodeTree>, container: NodeId) -> HandlerChain {
    let weak = Rc::downgrade(tree);
    HandlerChain::new().prepend(move |_node, action, next| {
        let tree = weak.upgrade()?;
        let children = tree.children(&container);
        let focused = tree.focused_id()?;
        let index = children.iter().position(|c| *c == focused)?;
        let target = match action {
            ChainAction::Navigate(NavigationAction::Down) => children.get((index + 1) % children.len()),
            ChainAction::Navigate(NavigationAction::Up) => {
                children.get((index + children.len() - 1) % children.len())
            }
            _ => return next.run(),
        };
        target.map(|id| Resolution::Focus(id.clone()))
    })
}

fn build_fixture() -> Fixture {
    let registry = Rc::new(FocusRegistry::new());
    let tree = Rc::new(NodeTree::new());
    let list = tree
        .insert(ROOT_ID, "list", HandlerChain::new())
        .expect("list node");
    tree.set_handler(&list, list_chain(&tree, list.clone()))
        .expect("list handler");

    let mut items = Vec::new();
    let mut handlers = Vec::new();
    for row in 0..ITEMS {
        let local = format!("item{row}");
        let handler = ElementHandler::new();
        let id = tree
            .insert(&list, &local, handler.chain())
            .expect("item node");
        let element: ElementRef =
            Rc::new(ZoneElement::new(local, registry.clone()).with_rect(Rect::new(0, row, 40, 1)));
        handler.register(Some(element));
        items.push(id);
        handlers.push(handler);
    }
    tree.focus(&items[0]).expect("initial focus");

    let config = BindingConfig::default()
        .with_logger(Logger::new(NullSink).with_min_level(LogLevel::Info));
    let hub = Rc::new(EventHub::new());
    let mut mapper = ActionMapper::new(config.clone());
    mapper
        .attach(tree.clone(), hub.clone(), default_event_mapping())
        .expect("mapper");
    let mut sync = FocusSync::new(config);
    sync.attach(tree.clone()).expect("sync");

    Fixture {
        tree,
        hub,
        items,
        _handlers: handlers,
        _mapper: mapper,
        _sync: sync,
    }
}

fn key_to_real_focus(c: &mut Criterion) {
    let fixture = build_fixture();
    let down = Event::Key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
    c.bench_function("binding_key_to_real_focus", |b| {
        b.iter(|| {
            fixture.hub.emit(black_box(&down)).expect("emit");
        });
    });
}

fn position_query(c: &mut Criterion) {
    let fixture = build_fixture();
    let target = fixture.items[ITEMS as usize / 2].clone();
    c.bench_function("binding_position_query", |b| {
        b.iter(|| black_box(NODE_POSITION.query(&*fixture.tree, black_box(&target))));
    });
}

criterion_group!(benches, key_to_real_focus, position_query);
criterion_main!(benches);
