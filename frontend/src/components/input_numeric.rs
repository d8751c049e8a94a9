use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use leptos::*;
use shared::value::{from_native, to_native};
use shared::{
    Command, Constraints, Decimal, Direction, Key, Msg, RepeatTiming, Spinner, SpinnerOptions,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Callbacks handed to the component, all receiving the caller's `f64`.
#[derive(Clone, Default)]
struct SpinnerCallbacks {
    on_change: Option<Callback<f64>>,
    on_blur: Option<Callback<f64>>,
    on_focus: Option<Callback<f64>>,
}

/// One widget instance: its state, the rendered text and the two timers.
///
/// Timer callbacks hold a clone of the handle, so a running timer keeps the
/// instance alive until it is cancelled on release, disable or teardown.
#[derive(Clone)]
struct SpinnerHandle {
    spinner: Rc<RefCell<Spinner>>,
    display: RwSignal<String>,
    delay: Rc<RefCell<Option<Timeout>>>,
    interval: Rc<RefCell<Option<Interval>>>,
    callbacks: SpinnerCallbacks,
}

impl SpinnerHandle {
    fn new(spinner: Spinner, callbacks: SpinnerCallbacks) -> Self {
        let display = create_rw_signal(spinner.display());
        Self {
            spinner: Rc::new(RefCell::new(spinner)),
            display,
            delay: Rc::new(RefCell::new(None)),
            interval: Rc::new(RefCell::new(None)),
            callbacks,
        }
    }

    fn dispatch(&self, msg: Msg) {
        let commands = self.spinner.borrow_mut().update(msg);
        let text = self.spinner.borrow().display();
        self.display.set(text);

        for command in commands {
            self.run(command);
        }
    }

    fn run(&self, command: Command) {
        match command {
            Command::Changed(v) => notify(self.callbacks.on_change, v),
            Command::Settled(v) => notify(self.callbacks.on_blur, v),
            Command::Focused(v) => notify(self.callbacks.on_focus, v),
            Command::ArmDelay(ms) => {
                let handle = self.clone();
                let timeout = Timeout::new(ms, move || {
                    handle.dispatch(Msg::DelayElapsed);
                });
                *self.delay.borrow_mut() = Some(timeout);
            }
            Command::StartInterval(ms) => {
                let handle = self.clone();
                let interval = Interval::new(ms, move || {
                    handle.dispatch(Msg::Tick);
                });
                *self.interval.borrow_mut() = Some(interval);
            }
            Command::CancelTimers => self.cancel_timers(),
        }
    }

    /// Dropping a gloo timer clears it.
    fn cancel_timers(&self) {
        let delay = self.delay.borrow_mut().take();
        drop(delay);
        let interval = self.interval.borrow_mut().take();
        drop(interval);
    }

    /// Unmount: stop any gesture without notifying and release the timers.
    /// Does not touch signals, which may already be disposed.
    fn teardown(&self) {
        self.spinner.borrow_mut().update(Msg::Teardown);
        self.cancel_timers();
    }
}

fn notify(callback: Option<Callback<f64>>, decimal: Decimal) {
    if let Some(callback) = callback {
        callback.call(to_native(decimal));
    }
}

/// Build constraints from the component's native-number props.
///
/// Props that cannot be represented as a decimal are dropped with a warning.
pub fn constraints_from_props(
    min: Option<f64>,
    max: Option<f64>,
    step: Option<f64>,
    decimals: Option<u32>,
    snap_to_step: bool,
    show_trailing_zeros: bool,
) -> Constraints {
    let convert = |name: &str, raw: Option<f64>| -> Option<Decimal> {
        let raw = raw?;
        match from_native(raw) {
            Ok(decimal) => Some(decimal),
            Err(err) => {
                log::warn!("ignoring {} prop: {}", name, err);
                None
            }
        }
    };

    let mut constraints = Constraints::default()
        .snap_to_step(snap_to_step)
        .show_trailing_zeros(show_trailing_zeros);
    constraints.min = convert("min", min);
    constraints.max = convert("max", max);
    if let Some(step) = convert("step", step) {
        constraints.step = step;
    }
    if let Some(decimals) = decimals {
        constraints.decimals = decimals;
    }
    constraints.validated()
}

pub fn container_class(extra: Option<&str>, disabled: bool) -> String {
    let mut classes = vec!["input-numeric"];
    if disabled {
        classes.push("input-numeric-disabled");
    }
    if let Some(extra) = extra {
        classes.push(extra);
    }
    classes.join(" ")
}

pub fn button_class(direction: Direction) -> &'static str {
    match direction {
        Direction::Increment => "input-numeric-button input-numeric-increment",
        Direction::Decrement => "input-numeric-button input-numeric-decrement",
    }
}

pub fn button_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Increment => "+",
        Direction::Decrement => "\u{2212}",
    }
}

/// Numeric spinner: a text field with increment/decrement buttons.
///
/// `value` is controlled by the caller. The widget reports every committed
/// change through `on_change` and the end of an edit or hold gesture through
/// `on_blur`. Holding a button or an arrow key steps once, then repeats
/// after `timing.delay_ms` every `timing.interval_ms`.
///
/// Constraint and timing props may be signals. A change re-clamps the value,
/// reporting the correction through `on_change`.
#[component]
pub fn InputNumeric(
    #[prop(into)] value: MaybeSignal<f64>,
    #[prop(optional, into)] min: MaybeProp<f64>,
    #[prop(optional, into)] max: MaybeProp<f64>,
    #[prop(optional, into)] step: MaybeProp<f64>,
    #[prop(optional, into)] decimals: MaybeProp<u32>,
    #[prop(optional, into)] snap_to_step: MaybeSignal<bool>,
    #[prop(optional, into)] show_trailing_zeros: MaybeSignal<bool>,
    #[prop(into, default = MaybeSignal::Static(true))] show_buttons: MaybeSignal<bool>,
    #[prop(optional, into)] disabled: MaybeSignal<bool>,
    #[prop(optional, into)] timing: MaybeProp<RepeatTiming>,
    #[prop(optional)] on_change: Option<Callback<f64>>,
    #[prop(optional)] on_blur: Option<Callback<f64>>,
    #[prop(optional)] on_focus: Option<Callback<f64>>,
    #[prop(optional, into)] id: Option<String>,
    #[prop(optional, into)] class: Option<String>,
) -> impl IntoView {
    let constraints = create_memo(move |_| {
        constraints_from_props(
            min.get(),
            max.get(),
            step.get(),
            decimals.get(),
            snap_to_step.get(),
            show_trailing_zeros.get(),
        )
    });
    let repeat_timing = create_memo(move |_| timing.get().unwrap_or_default());
    let options = SpinnerOptions::new(constraints.get_untracked())
        .with_timing(repeat_timing.get_untracked())
        .with_disabled(disabled.get_untracked());

    let initial = from_native(value.get_untracked()).unwrap_or_else(|err| {
        log::warn!("initial value unusable, starting at zero: {}", err);
        Decimal::ZERO
    });

    let handle = SpinnerHandle::new(
        Spinner::new(initial, options),
        SpinnerCallbacks {
            on_change,
            on_blur,
            on_focus,
        },
    );
    let display = handle.display;

    let teardown_handle = handle.clone();
    on_cleanup(move || teardown_handle.teardown());

    let stored = store_value(handle);
    let send = Callback::new(move |msg: Msg| stored.with_value(|h| h.dispatch(msg)));

    // The caller's value is re-validated only when it differs from ours,
    // so echoes of our own on_change are ignored.
    create_effect(move |_| {
        let next = value.get();
        match from_native(next) {
            Ok(decimal) => send.call(Msg::External(decimal)),
            Err(err) => log::warn!("ignoring external value: {}", err),
        }
    });

    create_effect(move |_| {
        send.call(Msg::SetDisabled(disabled.get()));
    });

    create_effect(move |_| {
        send.call(Msg::SetConstraints(constraints.get()));
    });

    create_effect(move |_| {
        send.call(Msg::SetTiming(repeat_timing.get()));
    });

    let class_clone = class.clone();
    let full_class = move || container_class(class_clone.as_deref(), disabled.get());

    let on_keydown = move |ev: ev::KeyboardEvent| {
        let key = Key::from_key_name(&ev.key());
        if key.direction().is_some() {
            ev.prevent_default();
        }
        send.call(Msg::KeyDown(key));
    };

    view! {
        <div class=full_class>
            {move || show_buttons.get().then(|| view! {
                <StepButton direction=Direction::Decrement disabled=disabled send=send />
            })}
            <input
                type="text"
                inputmode="decimal"
                class="input-numeric-field"
                id=id
                disabled=move || disabled.get()
                prop:value=move || display.get()
                on:input=move |ev| send.call(Msg::Input(event_target_value(&ev)))
                on:focus=move |_| send.call(Msg::Focus)
                on:blur=move |_| send.call(Msg::Blur)
                on:keydown=on_keydown
                on:keyup=move |ev: ev::KeyboardEvent| {
                    send.call(Msg::KeyUp(Key::from_key_name(&ev.key())))
                }
            />
            {move || show_buttons.get().then(|| view! {
                <StepButton direction=Direction::Increment disabled=disabled send=send />
            })}
        </div>
    }
}

#[component]
fn StepButton(direction: Direction, disabled: MaybeSignal<bool>, send: Callback<Msg>) -> impl IntoView {
    let button_ref = create_node_ref::<html::Button>();

    // touchstart must be non-passive and on the element itself, or
    // preventDefault cannot suppress the mouse events emulated after a tap.
    create_effect(move |_| {
        let Some(button) = button_ref.get() else {
            return;
        };
        let handler = Closure::wrap(Box::new(move |event: web_sys::Event| {
            event.prevent_default();
            send.call(Msg::Press(direction));
        }) as Box<dyn FnMut(_)>);

        let options = web_sys::AddEventListenerOptions::new();
        options.set_passive(false);
        let target: web_sys::EventTarget = (*button).clone().into();
        let _ = target.add_event_listener_with_callback_and_add_event_listener_options(
            "touchstart",
            handler.as_ref().unchecked_ref(),
            &options,
        );

        on_cleanup(move || {
            let _ = target
                .remove_event_listener_with_callback("touchstart", handler.as_ref().unchecked_ref());
            drop(handler);
        });
    });

    view! {
        <button
            type="button"
            tabindex="-1"
            class=button_class(direction)
            node_ref=button_ref
            disabled=move || disabled.get()
            on:mousedown=move |_| send.call(Msg::Press(direction))
            on:mouseup=move |_| send.call(Msg::Release)
            on:mouseleave=move |_| send.call(Msg::Release)
            on:touchend=move |_| send.call(Msg::Release)
            on:touchcancel=move |_| send.call(Msg::Release)
        >
            {button_label(direction)}
        </button>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gloo_timers::future::TimeoutFuture;
    use std::cell::Cell;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_container_class() {
        assert_eq!(container_class(None, false), "input-numeric");
        assert_eq!(
            container_class(Some("wide"), true),
            "input-numeric input-numeric-disabled wide"
        );
    }

    #[wasm_bindgen_test]
    fn test_button_class_and_label() {
        assert!(button_class(Direction::Increment).contains("input-numeric-increment"));
        assert!(button_class(Direction::Decrement).contains("input-numeric-decrement"));
        assert_eq!(button_label(Direction::Increment), "+");
        assert_eq!(button_label(Direction::Decrement), "\u{2212}");
    }

    #[wasm_bindgen_test]
    fn test_constraints_from_props() {
        let c = constraints_from_props(Some(0.0), Some(10.0), Some(0.2), Some(4), true, false);
        assert_eq!(c.min, Some(Decimal::ZERO));
        assert_eq!(c.max, Some(Decimal::TEN));
        assert_eq!(c.step, Decimal::new(2, 1));
        assert_eq!(c.decimals, 4);
        assert!(c.snap_to_step);
        assert!(!c.show_trailing_zeros);
    }

    #[wasm_bindgen_test]
    fn test_constraints_from_props_drops_unusable_values() {
        let c = constraints_from_props(Some(f64::NAN), None, Some(0.0), None, false, true);
        assert_eq!(c.min, None);
        assert_eq!(c.max, None);
        assert_eq!(c.step, Decimal::ONE);
        assert!(c.show_trailing_zeros);
    }

    fn mount_root() -> web_sys::HtmlElement {
        let root: web_sys::HtmlElement = document().create_element("div").unwrap().unchecked_into();
        document().body().unwrap().append_child(&root).unwrap();
        root
    }

    fn field(root: &web_sys::Element) -> web_sys::HtmlInputElement {
        root.query_selector(".input-numeric-field")
            .unwrap()
            .unwrap()
            .unchecked_into()
    }

    fn button(root: &web_sys::Element, direction: Direction) -> web_sys::Element {
        let selector = match direction {
            Direction::Increment => ".input-numeric-increment",
            Direction::Decrement => ".input-numeric-decrement",
        };
        root.query_selector(selector).unwrap().unwrap()
    }

    fn fire(target: &web_sys::Element, event_type: &str) {
        // bubbling, so delegated listeners see it
        let init = web_sys::MouseEventInit::new();
        init.set_bubbles(true);
        let event = web_sys::MouseEvent::new_with_mouse_event_init_dict(event_type, &init).unwrap();
        target.dispatch_event(&event).unwrap();
    }

    /// Returns false when a listener prevented the default action.
    fn fire_key(target: &web_sys::Element, event_type: &str, key: &str) -> bool {
        let init = web_sys::KeyboardEventInit::new();
        init.set_key(key);
        init.set_bubbles(true);
        init.set_cancelable(true);
        let event =
            web_sys::KeyboardEvent::new_with_keyboard_event_init_dict(event_type, &init).unwrap();
        target.dispatch_event(&event).unwrap()
    }

    fn type_text(input: &web_sys::HtmlInputElement, text: &str) {
        input.set_value(text);
        let init = web_sys::EventInit::new();
        init.set_bubbles(true);
        let event = web_sys::Event::new_with_event_init_dict("input", &init).unwrap();
        input.dispatch_event(&event).unwrap();
    }

    #[wasm_bindgen_test]
    fn test_press_and_release_steps_once() {
        let changes = Rc::new(Cell::new(0));
        let settles = Rc::new(Cell::new(0));
        let changes_clone = changes.clone();
        let settles_clone = settles.clone();

        let root = mount_root();
        mount_to(root.clone(), move || {
            let value = create_rw_signal(5.0);
            let changes = changes_clone.clone();
            let settles = settles_clone.clone();
            view! {
                <InputNumeric
                    value=value
                    max=6.0
                    decimals=2
                    show_trailing_zeros=true
                    on_change=Callback::new(move |v| {
                        changes.set(changes.get() + 1);
                        value.set(v);
                    })
                    on_blur=Callback::new(move |_| settles.set(settles.get() + 1))
                />
            }
        });

        assert_eq!(field(&root).value(), "5.00");

        let plus = button(&root, Direction::Increment);
        fire(&plus, "mousedown");
        fire(&plus, "mouseup");
        fire(&plus, "mouseleave");

        assert_eq!(field(&root).value(), "6.00");
        assert_eq!(changes.get(), 1);
        assert_eq!(settles.get(), 1);

        // already at max
        fire(&plus, "mousedown");
        fire(&plus, "mouseup");
        assert_eq!(field(&root).value(), "6.00");
        assert_eq!(changes.get(), 1);
        assert_eq!(settles.get(), 2);

        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_arrow_keys_step_and_settle() {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let settles = Rc::new(Cell::new(0));
        let changes_clone = changes.clone();
        let settles_clone = settles.clone();

        let root = mount_root();
        mount_to(root.clone(), move || {
            let value = create_rw_signal(1.0);
            let changes = changes_clone.clone();
            let settles = settles_clone.clone();
            view! {
                <InputNumeric
                    value=value
                    step=0.5
                    decimals=1
                    on_change=Callback::new(move |v| {
                        changes.borrow_mut().push(v);
                        value.set(v);
                    })
                    on_blur=Callback::new(move |_| settles.set(settles.get() + 1))
                />
            }
        });

        let input = field(&root);
        assert!(
            !fire_key(&input, "keydown", "ArrowUp"),
            "arrow keydown should not move the caret"
        );
        assert_eq!(input.value(), "1.5");

        // auto-repeat and an unrelated key while the arrow is held
        fire_key(&input, "keydown", "ArrowUp");
        assert!(fire_key(&input, "keydown", "Shift"));
        fire_key(&input, "keyup", "Shift");
        assert_eq!(input.value(), "1.5");
        assert_eq!(settles.get(), 0);

        fire_key(&input, "keyup", "ArrowUp");
        assert_eq!(settles.get(), 1);

        assert!(!fire_key(&input, "keydown", "ArrowDown"));
        fire_key(&input, "keyup", "ArrowDown");
        assert_eq!(input.value(), "1");
        assert_eq!(*changes.borrow(), vec![1.5, 1.0]);
        assert_eq!(settles.get(), 2);

        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_enter_commits_typed_text() {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let settles = Rc::new(Cell::new(0));
        let changes_clone = changes.clone();
        let settles_clone = settles.clone();

        let root = mount_root();
        mount_to(root.clone(), move || {
            let changes = changes_clone.clone();
            let settles = settles_clone.clone();
            view! {
                <InputNumeric
                    value=0.0
                    max=100.0
                    on_change=Callback::new(move |v| changes.borrow_mut().push(v))
                    on_blur=Callback::new(move |_| settles.set(settles.get() + 1))
                />
            }
        });

        let input = field(&root);
        type_text(&input, "420");
        assert_eq!(input.value(), "420");
        assert!(changes.borrow().is_empty());

        assert!(fire_key(&input, "keydown", "Enter"));
        fire_key(&input, "keyup", "Enter");
        assert_eq!(*changes.borrow(), vec![100.0]);
        assert_eq!(input.value(), "100");
        assert_eq!(settles.get(), 0);

        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_constraint_props_follow_signals() {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let changes_clone = changes.clone();
        let max = create_rw_signal(Some(10.0));
        let decimals = create_rw_signal(Some(0u32));
        let trailing = create_rw_signal(false);

        let root = mount_root();
        mount_to(root.clone(), move || {
            let value = create_rw_signal(8.0);
            let changes = changes_clone.clone();
            view! {
                <InputNumeric
                    value=value
                    max=max
                    decimals=decimals
                    show_trailing_zeros=trailing
                    on_change=Callback::new(move |v| {
                        changes.borrow_mut().push(v);
                        value.set(v);
                    })
                />
            }
        });
        assert_eq!(field(&root).value(), "8");

        max.set(Some(5.0));
        assert_eq!(*changes.borrow(), vec![5.0]);
        assert_eq!(field(&root).value(), "5");

        decimals.set(Some(2));
        trailing.set(true);
        assert_eq!(field(&root).value(), "5.00");

        // lifting the bound does not move the value
        max.set(None);
        fire(&button(&root, Direction::Increment), "mousedown");
        fire(&button(&root, Direction::Increment), "mouseup");
        assert_eq!(*changes.borrow(), vec![5.0, 6.0]);

        root.remove();
    }

    #[wasm_bindgen_test]
    async fn test_touch_press_is_not_replayed_as_mouse() {
        let changes = Rc::new(Cell::new(0));
        let settles = Rc::new(Cell::new(0));
        let changes_clone = changes.clone();
        let settles_clone = settles.clone();

        let root = mount_root();
        mount_to(root.clone(), move || {
            let changes = changes_clone.clone();
            let settles = settles_clone.clone();
            view! {
                <InputNumeric
                    value=3.0
                    on_change=Callback::new(move |_| changes.set(changes.get() + 1))
                    on_blur=Callback::new(move |_| settles.set(settles.get() + 1))
                />
            }
        });
        // node refs are filled after the first render
        TimeoutFuture::new(0).await;

        let minus = button(&root, Direction::Decrement);
        let init = web_sys::EventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        let touch = web_sys::Event::new_with_event_init_dict("touchstart", &init).unwrap();
        minus.dispatch_event(&touch).unwrap();
        assert!(touch.default_prevented());
        assert_eq!(field(&root).value(), "2");

        fire(&minus, "touchend");
        assert_eq!(changes.get(), 1);
        assert_eq!(settles.get(), 1);

        root.remove();
    }

    #[wasm_bindgen_test]
    async fn test_unmount_during_hold_stops_timers() {
        let changes = Rc::new(Cell::new(0));
        let changes_clone = changes.clone();
        let visible = create_rw_signal(true);

        let root = mount_root();
        mount_to(root.clone(), move || {
            let changes = changes_clone.clone();
            let on_change = Callback::new(move |_| changes.set(changes.get() + 1));
            let timing = RepeatTiming {
                delay_ms: 20,
                interval_ms: 10,
            };
            view! {
                <Show when=move || visible.get()>
                    <InputNumeric value=0.0 timing=timing on_change=on_change />
                </Show>
            }
        });

        fire(&button(&root, Direction::Increment), "mousedown");
        assert_eq!(changes.get(), 1);
        TimeoutFuture::new(100).await;
        assert!(changes.get() > 1, "hold should repeat while mounted");

        visible.set(false);
        let at_unmount = changes.get();
        TimeoutFuture::new(100).await;
        assert_eq!(changes.get(), at_unmount);
        assert!(root.query_selector(".input-numeric").unwrap().is_none());

        root.remove();
    }
}
