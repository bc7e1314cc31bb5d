use std::cell::RefCell as StdRefCell;
use std::rc::Rc;
use weft_core::{Observable, PropertyChange, Value};

#[test]
fn set_notifies_change_listeners() {
    let state = Observable::new().with("count", 0);
    let seen: Rc<StdRefCell<Vec<PropertyChange>>> = Rc::new(StdRefCell::new(vec![]));

    {
        let seen_cb = seen.clone();
        state.on("change:count", move |evt| {
            seen_cb
                .borrow_mut()
                .push(evt.data::<PropertyChange>().cloned().unwrap());
        });
    }

    state.set("count", 42);
    assert_eq!(state.get("count"), Value::Int(42));
    assert_eq!(
        &*seen.borrow(),
        &vec![PropertyChange {
            property: "count".into(),
            value: Value::Int(42),
            old_value: Value::Int(0),
        }]
    );
}

#[test]
fn setting_same_value_is_silent() {
    let state = Observable::new().with("label", "a");
    let calls = Rc::new(StdRefCell::new(0));
    {
        let c = calls.clone();
        state.on("change:label", move |_| *c.borrow_mut() += 1);
    }
    state.set("label", "a");
    assert_eq!(*calls.borrow(), 0);
    state.set("label", "b");
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn missing_property_is_undefined() {
    let state = Observable::new();
    assert_eq!(state.get("nope"), Value::Undefined);
    assert!(!state.has("nope"));
}

#[test]
fn listeners_fire_in_subscription_order() {
    let state = Observable::new();
    let order = Rc::new(StdRefCell::new(vec![]));
    for i in 0..3 {
        let o = order.clone();
        state.on("change:x", move |_| o.borrow_mut().push(i));
    }
    state.set("x", true);
    assert_eq!(&*order.borrow(), &vec![0, 1, 2]);
}

#[test]
fn listener_removed_mid_dispatch_does_not_run() {
    let state = Observable::new();
    let ran = Rc::new(StdRefCell::new(false));
    let second_id = Rc::new(StdRefCell::new(None));

    {
        let state_cb = state.clone();
        let id = second_id.clone();
        state.on("change:x", move |_| {
            if let Some(id) = *id.borrow() {
                state_cb.off(id);
            }
        });
    }
    {
        let r = ran.clone();
        let id = state.on("change:x", move |_| *r.borrow_mut() = true);
        *second_id.borrow_mut() = Some(id);
    }

    state.set("x", 1);
    assert!(!*ran.borrow());
    assert_eq!(state.listener_count("change:x"), 1);
}

#[test]
fn listener_may_set_other_properties() {
    let state = Observable::new().with("a", 0).with("b", 0);
    {
        let s = state.clone();
        state.on("change:a", move |evt| {
            let v = evt.data::<PropertyChange>().unwrap().value.clone();
            s.set("b", v);
        });
    }
    state.set("a", 7);
    assert_eq!(state.get("b"), Value::Int(7));
}

#[test]
fn fire_carries_arbitrary_payload() {
    let state = Observable::new();
    let got = Rc::new(StdRefCell::new(String::new()));
    {
        let g = got.clone();
        state.on("execute", move |evt| {
            *g.borrow_mut() = evt.data::<&'static str>().copied().unwrap_or("").to_string();
        });
    }
    state.fire("execute", "payload");
    assert_eq!(&*got.borrow(), "payload");
}
