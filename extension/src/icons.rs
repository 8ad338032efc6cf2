// Lucide icon components for Dioxus
// SVG icons inlined, the popup loads no external assets

use dioxus::prelude::*;

#[component]
fn Lucide(class: Option<String>, children: Element) -> Element {
    rsx! {
        svg {
            class: "{class.unwrap_or_default()}",
            xmlns: "http://www.w3.org/2000/svg",
            width: "24",
            height: "24",
            view_box: "0 0 24 24",
            fill: "none",
            stroke: "currentColor",
            stroke_width: "2",
            stroke_linecap: "round",
            stroke_linejoin: "round",
            {children}
        }
    }
}

#[component]
pub fn Power(class: Option<String>) -> Element {
    rsx! {
        Lucide { class,
            path { d: "M12 2v10" }
            path { d: "M18.4 6.6a9 9 0 1 1-12.77.04" }
        }
    }
}

#[component]
pub fn Battery(class: Option<String>) -> Element {
    rsx! {
        Lucide { class,
            rect { width: "16", height: "10", x: "2", y: "7", rx: "2", ry: "2" }
            line { x1: "22", x2: "22", y1: "11", y2: "13" }
        }
    }
}

#[component]
pub fn BatteryCharging(class: Option<String>) -> Element {
    rsx! {
        Lucide { class,
            path { d: "M15 7h1a2 2 0 0 1 2 2v6a2 2 0 0 1-2 2h-2" }
            path { d: "M6 7H4a2 2 0 0 0-2 2v6a2 2 0 0 0 2 2h1" }
            path { d: "m11 7-3 5h4l-3 5" }
            line { x1: "22", x2: "22", y1: "11", y2: "13" }
        }
    }
}

#[component]
pub fn Bell(class: Option<String>) -> Element {
    rsx! {
        Lucide { class,
            path { d: "M6 8a6 6 0 0 1 12 0c0 7 3 9 3 9H3s3-2 3-9" }
            path { d: "M10.3 21a1.94 1.94 0 0 0 3.4 0" }
        }
    }
}
