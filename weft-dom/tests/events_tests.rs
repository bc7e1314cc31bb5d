use std::cell::RefCell;
use std::rc::Rc;

use weft_core::Emitter;
use weft_dom::{h, DomEvent, Node, Props};

fn tree() -> (Node, Node) {
    let root = h("div", (), vec![h("button", Props::new().set("class", "action"), vec![])]).mount();
    let button = root.first_child().unwrap();
    (root, button)
}

#[test]
fn events_bubble_to_ancestors() {
    let (root, button) = tree();
    let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(vec![]));

    {
        let l = log.clone();
        root.add_event_listener("click", move |evt| {
            let target = evt.target().unwrap().tag_name().unwrap().to_string();
            let current = evt.current_target().unwrap().tag_name().unwrap().to_string();
            l.borrow_mut().push(format!("{current}<-{target}"));
        });
    }
    button.click();
    assert_eq!(&*log.borrow(), &vec!["div<-button".to_string()]);
}

#[test]
fn non_bubbling_and_stopped_events_stay_put() {
    let (root, button) = tree();
    let hits = Rc::new(RefCell::new(0));
    {
        let count = hits.clone();
        root.add_event_listener("focus", move |_| *count.borrow_mut() += 1);
    }
    button.dispatch_event(DomEvent::non_bubbling("focus"));
    assert_eq!(*hits.borrow(), 0);

    {
        let count = hits.clone();
        root.add_event_listener("click", move |_| *count.borrow_mut() += 1);
    }
    button.add_event_listener("click", |evt| evt.stop_propagation());
    let evt = button.click();
    assert!(evt.is_propagation_stopped());
    assert_eq!(*hits.borrow(), 0);
}

#[test]
fn removed_listeners_do_not_fire() {
    let (_root, button) = tree();
    let hits = Rc::new(RefCell::new(0));
    let id = {
        let count = hits.clone();
        button.add_event_listener("click", move |_| *count.borrow_mut() += 1)
    };
    button.click();
    button.remove_event_listener(id);
    button.click();
    assert_eq!(*hits.borrow(), 1);
    assert_eq!(button.listener_count(), 0);
}

#[test]
fn emitter_owns_dom_listeners() {
    let (_root, button) = tree();
    let emitter = Emitter::new();
    let hits = Rc::new(RefCell::new(0));
    {
        let count = hits.clone();
        emitter.listen_to(&button, "click", move |_| *count.borrow_mut() += 1);
    }
    button.click();
    emitter.stop_listening();
    button.click();
    assert_eq!(*hits.borrow(), 1);
    assert_eq!(button.listener_count(), 0);
}
