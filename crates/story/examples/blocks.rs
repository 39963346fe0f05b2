use gpui::*;
use gpui_component::Root;

use gpui_manos_blocks_core::BlocksConfig;
use gpui_manos_blocks_story::blocks::BlocksStory;

fn main() {
    gpui_manos_blocks_story::init_tracing();
    let app = Application::new();

    app.run(move |cx| {
        gpui_component::init(cx);
        gpui_manos_blocks::init(cx);
        cx.activate(true);

        cx.spawn(async move |cx| {
            cx.open_window(
                WindowOptions {
                    titlebar: Some(TitlebarOptions {
                        title: Some("Blocks".into()),
                        appears_transparent: false,
                        traffic_light_position: None,
                    }),
                    ..Default::default()
                },
                |window, cx| {
                    let config = BlocksConfig::default().with_defaults();
                    let view = BlocksStory::view(config, window, cx);
                    cx.new(|cx| Root::new(view, window, cx))
                },
            )?;

            Ok::<_, anyhow::Error>(())
        })
        .detach();
    });
}
